// src/services/document_service.rs

use genpdf::{elements, style, Element};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BudgetRepository, SettingsRepository},
    pricing::calculate_item,
    services::budget_service,
};

#[derive(Clone)]
pub struct DocumentService {
    repo: BudgetRepository,
    settings_repo: SettingsRepository,
}

impl DocumentService {
    pub fn new(repo: BudgetRepository, settings_repo: SettingsRepository) -> Self {
        Self {
            repo,
            settings_repo,
        }
    }

    /// Renderiza a proposta comercial do orçamento como PDF em memória.
    pub async fn generate_budget_pdf(
        &self,
        pool: &PgPool,
        budget_id: Uuid,
    ) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados
        let budget = self.repo.find_by_id(pool, budget_id).await?;
        let items = self.repo.list_items(pool, budget_id).await?;
        let config = self.settings_repo.get_configuration(pool).await?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Orçamento {}", budget.order_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(format!("PROPOSTA COMERCIAL {}", budget.order_number))
                .styled(style::Style::new().bold().with_font_size(16)),
        );

        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            budget.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Cliente: {}",
            budget.client_name
        )));

        doc.push(elements::Break::new(2));

        // --- TABELA DE ITENS ---
        // Pesos das colunas: Descrição (4), Peso (1), Prazo (1), Unitário (2), Total (2)
        let mut table = elements::TableLayout::new(vec![4, 1, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        // Header da Tabela
        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Descrição").styled(style_bold))
            .element(elements::Paragraph::new("Peso (kg)").styled(style_bold))
            .element(elements::Paragraph::new("Prazo").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .expect("Table error");

        // Linhas: o valor unitário é o preço com ICMS (o que o cliente
        // paga); o total da linha inclui o IPI.
        for item in &items {
            let financials = calculate_item(
                &budget_service::item_input_from_record(item),
                config.commission_default,
            );

            table
                .row()
                .element(elements::Paragraph::new(item.description.clone()))
                .element(elements::Paragraph::new(format!("{:.2}", item.peso_venda)))
                .element(elements::Paragraph::new(format!(
                    "{} dias",
                    item.delivery_time
                )))
                .element(elements::Paragraph::new(format!(
                    "R$ {:.2}",
                    item.valor_com_icms_venda
                )))
                .element(elements::Paragraph::new(format!(
                    "R$ {:.2}",
                    financials.total_with_ipi
                )))
                .push()
                .expect("Table row error");
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        if !budget.total_ipi_value.is_zero() {
            let mut ipi_paragraph =
                elements::Paragraph::new(format!("IPI: R$ {:.2}", budget.total_ipi_value));
            ipi_paragraph.set_alignment(genpdf::Alignment::Right);
            doc.push(ipi_paragraph);
        }

        let mut total_paragraph = elements::Paragraph::new(format!(
            "VALOR TOTAL: R$ {:.2}",
            budget.total_final_value
        ));
        total_paragraph.set_alignment(genpdf::Alignment::Right);
        doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

        doc.push(elements::Break::new(2));
        doc.push(
            elements::Paragraph::new("Valores com ICMS incluso. Proposta válida por 15 dias.")
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        // 3. Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
