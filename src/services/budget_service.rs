// src/services/budget_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BudgetRepository, SettingsRepository},
    models::budget::{
        AutoMarkupBudgetPayload, AutoMarkupCalculation, AutoMarkupItemResult, Budget,
        BudgetCalculation, BudgetDetail, BudgetItem, BudgetItemDetail, BudgetItemPayload,
        BudgetStatus, CalculateBudgetPayload, CreateBudgetPayload, UpdateBudgetPayload,
    },
    models::settings::MarkupConfiguration,
    pricing::{
        aggregate, calculate_item,
        item::round_money,
        markup::sale_gross_from_markup,
        net_value, resolve_markup, ItemFinancials, ItemInput, MarkupInputs,
    },
};

/// Margem mínima assumida quando o orçamento não define a sua.
const DEFAULT_MINIMUM_MARGIN: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

#[derive(Clone)]
pub struct BudgetService {
    repo: BudgetRepository,
    settings_repo: SettingsRepository,
}

impl BudgetService {
    pub fn new(repo: BudgetRepository, settings_repo: SettingsRepository) -> Self {
        Self { repo, settings_repo }
    }

    // =========================================================================
    //  CÁLCULO STATELESS
    // =========================================================================

    /// Cálculo puro sobre o payload: nenhum estado de sessão no servidor,
    /// seguro para repetir e paralelizar. Atende /calculate e
    /// /calculate-simplified.
    pub async fn calculate_preview(
        &self,
        pool: &PgPool,
        payload: CalculateBudgetPayload,
    ) -> Result<BudgetCalculation, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;

        let items: Vec<ItemFinancials> = payload
            .items
            .iter()
            .map(|item| calculate_item(&item_input_from_payload(item), config.commission_default))
            .collect();

        let totals = aggregate(&items);

        Ok(BudgetCalculation { items, totals })
    }

    /// Fluxo de markup automático: resolve o markup a partir do custo e da
    /// política de mercado, deriva os preços de venda e agrega.
    pub async fn calculate_auto_markup(
        &self,
        pool: &PgPool,
        payload: AutoMarkupBudgetPayload,
    ) -> Result<AutoMarkupCalculation, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;

        // 1. Custo líquido de cada item (só a ponta de compra)
        let cost_units: Vec<Decimal> = payload
            .items
            .iter()
            .map(|item| {
                round_money(
                    net_value(item.valor_com_icms_compra, item.percentual_icms_compra)
                        + item.outras_despesas_item,
                )
            })
            .collect();

        let total_purchase_value: Decimal = payload
            .items
            .iter()
            .zip(&cost_units)
            .map(|(item, unit)| round_money(item.peso_compra * unit))
            .sum();

        // 2. Resolve o markup sob a janela da configuração
        let resolution = resolve_markup(&MarkupInputs {
            total_purchase_value,
            minimum_margin_percentage: payload
                .minimum_margin_percentage
                .unwrap_or(DEFAULT_MINIMUM_MARGIN),
            target_market_position: payload
                .target_market_position
                .unwrap_or(config.default_market_position),
            competitor_price: payload.competitor_price,
            market_reference_price: payload.market_reference_price,
            config: &config,
        })?;

        // 3. Deriva o preço de venda de cada item e roda o cálculo completo
        let mut results = Vec::with_capacity(payload.items.len());
        for (item, cost_unit) in payload.items.iter().zip(&cost_units) {
            let icms_venda = item
                .percentual_icms_venda
                .unwrap_or(config.icms_sale_default);

            let valor_com_icms_venda = round_money(
                sale_gross_from_markup(*cost_unit, resolution.markup_percentage, icms_venda)
                    .ok_or(AppError::SaleIcmsSaturated)?,
            );

            let input = ItemInput {
                peso_compra: item.peso_compra,
                peso_venda: item.peso_venda.unwrap_or(item.peso_compra),
                valor_com_icms_compra: item.valor_com_icms_compra,
                valor_com_icms_venda,
                percentual_icms_compra: item.percentual_icms_compra,
                percentual_icms_venda: icms_venda,
                outras_despesas_item: item.outras_despesas_item,
                percentual_ipi: item.percentual_ipi,
                percentual_comissao: item.percentual_comissao,
            };

            results.push(AutoMarkupItemResult {
                valor_com_icms_venda,
                financials: calculate_item(&input, config.commission_default),
            });
        }

        let financials: Vec<ItemFinancials> =
            results.iter().map(|r| r.financials.clone()).collect();
        let totals = aggregate(&financials);

        Ok(AutoMarkupCalculation {
            markup: resolution,
            items: results,
            totals,
        })
    }

    pub async fn next_order_number(&self, pool: &PgPool) -> Result<String, AppError> {
        self.repo.next_order_number(pool).await
    }

    // =========================================================================
    //  PERSISTÊNCIA
    // =========================================================================

    pub async fn create_budget(
        &self,
        pool: &PgPool,
        payload: CreateBudgetPayload,
    ) -> Result<BudgetDetail, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;

        let mut tx = pool.begin().await?;

        let order_number = self.repo.next_order_number(&mut *tx).await?;
        let budget = self
            .repo
            .insert_budget(
                &mut *tx,
                &order_number,
                &payload.client_name,
                payload
                    .minimum_margin_percentage
                    .unwrap_or(DEFAULT_MINIMUM_MARGIN),
                payload
                    .target_market_position
                    .unwrap_or(config.default_market_position),
                payload.competitor_price,
                payload.market_reference_price,
            )
            .await?;

        for (position, item) in payload.items.iter().enumerate() {
            self.repo
                .insert_item(&mut *tx, budget.id, position as i32, item)
                .await?;
        }

        // Recalcula os derivados na mesma transação: o cliente nunca lê
        // totais desatualizados.
        let detail = self
            .recalculate_in_tx(&mut tx, budget.id, &config)
            .await?;

        tx.commit().await?;

        Ok(detail)
    }

    /// Atualização substitui itens por inteiro; a validação do payload já
    /// garantiu pelo menos um item (remover o último é rejeitado).
    pub async fn update_budget(
        &self,
        pool: &PgPool,
        budget_id: Uuid,
        payload: UpdateBudgetPayload,
    ) -> Result<BudgetDetail, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;

        let mut tx = pool.begin().await?;

        self.repo
            .update_budget_header(
                &mut *tx,
                budget_id,
                &payload.client_name,
                payload
                    .minimum_margin_percentage
                    .unwrap_or(DEFAULT_MINIMUM_MARGIN),
                payload
                    .target_market_position
                    .unwrap_or(config.default_market_position),
                payload.competitor_price,
                payload.market_reference_price,
            )
            .await?;

        self.repo.delete_items(&mut *tx, budget_id).await?;
        for (position, item) in payload.items.iter().enumerate() {
            self.repo
                .insert_item(&mut *tx, budget_id, position as i32, item)
                .await?;
        }

        let detail = self.recalculate_in_tx(&mut tx, budget_id, &config).await?;

        tx.commit().await?;

        Ok(detail)
    }

    pub async fn get_budget(&self, pool: &PgPool, budget_id: Uuid) -> Result<BudgetDetail, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;
        let budget = self.repo.find_by_id(pool, budget_id).await?;
        let items = self.repo.list_items(pool, budget_id).await?;

        Ok(assemble_detail(budget, items, &config))
    }

    pub async fn list_budgets(&self, pool: &PgPool) -> Result<Vec<Budget>, AppError> {
        self.repo.list_budgets(pool).await
    }

    pub async fn delete_budget(&self, pool: &PgPool, budget_id: Uuid) -> Result<(), AppError> {
        self.repo.delete_budget(pool, budget_id).await
    }

    /// Recalcula os derivados a partir dos itens gravados, sob a
    /// configuração vigente.
    pub async fn recalculate(
        &self,
        pool: &PgPool,
        budget_id: Uuid,
    ) -> Result<BudgetDetail, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;

        let mut tx = pool.begin().await?;
        let detail = self.recalculate_in_tx(&mut tx, budget_id, &config).await?;
        tx.commit().await?;

        Ok(detail)
    }

    /// Reescreve o preço de venda de cada item aplicando o markup dado
    /// sobre o custo líquido, e recalcula o orçamento.
    pub async fn apply_markup(
        &self,
        pool: &PgPool,
        budget_id: Uuid,
        markup_percentage: Decimal,
    ) -> Result<BudgetDetail, AppError> {
        let config = self.settings_repo.get_configuration(pool).await?;

        // O markup manual também respeita a janela configurada
        let markup = markup_percentage
            .max(config.minimum_markup_percentage)
            .min(config.maximum_markup_percentage);

        let mut tx = pool.begin().await?;

        // Garante o 404 antes de mexer nos itens
        self.repo.find_by_id(&mut *tx, budget_id).await?;

        let items = self.repo.list_items(&mut *tx, budget_id).await?;
        for item in &items {
            let cost_unit = round_money(
                net_value(item.valor_com_icms_compra, item.percentual_icms_compra)
                    + item.outras_despesas_item,
            );
            let new_sale_value = round_money(
                sale_gross_from_markup(cost_unit, markup, item.percentual_icms_venda)
                    .ok_or(AppError::SaleIcmsSaturated)?,
            );
            self.repo
                .update_item_sale_value(&mut *tx, item.id, new_sale_value)
                .await?;
        }

        let detail = self.recalculate_in_tx(&mut tx, budget_id, &config).await?;

        tx.commit().await?;

        Ok(detail)
    }

    // =========================================================================
    //  CICLO DE VIDA
    // =========================================================================

    pub async fn transition_status(
        &self,
        pool: &PgPool,
        budget_id: Uuid,
        next: BudgetStatus,
    ) -> Result<Budget, AppError> {
        let budget = self.repo.find_by_id(pool, budget_id).await?;

        if !budget.status.can_transition_to(next) {
            return Err(AppError::InvalidStatusTransition {
                from: budget.status,
                to: next,
            });
        }

        self.repo.update_status(pool, budget_id, next).await
    }

    // --- internos ---

    async fn recalculate_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        budget_id: Uuid,
        config: &MarkupConfiguration,
    ) -> Result<BudgetDetail, AppError> {
        let items = self.repo.list_items(&mut **tx, budget_id).await?;

        let financials: Vec<ItemFinancials> = items
            .iter()
            .map(|item| calculate_item(&item_input_from_record(item), config.commission_default))
            .collect();
        let totals = aggregate(&financials);
        let markup = totals.markup_percentage;

        let budget = self
            .repo
            .update_totals(&mut **tx, budget_id, &totals, markup)
            .await?;

        Ok(assemble_detail(budget, items, config))
    }
}

fn item_input_from_payload(payload: &BudgetItemPayload) -> ItemInput {
    ItemInput {
        peso_compra: payload.peso_compra,
        peso_venda: payload.peso_venda,
        valor_com_icms_compra: payload.valor_com_icms_compra,
        valor_com_icms_venda: payload.valor_com_icms_venda,
        percentual_icms_compra: payload.percentual_icms_compra,
        percentual_icms_venda: payload.percentual_icms_venda,
        outras_despesas_item: payload.outras_despesas_item,
        percentual_ipi: payload.percentual_ipi,
        percentual_comissao: payload.percentual_comissao,
    }
}

pub(crate) fn item_input_from_record(item: &BudgetItem) -> ItemInput {
    ItemInput {
        peso_compra: item.peso_compra,
        peso_venda: item.peso_venda,
        valor_com_icms_compra: item.valor_com_icms_compra,
        valor_com_icms_venda: item.valor_com_icms_venda,
        percentual_icms_compra: item.percentual_icms_compra,
        percentual_icms_venda: item.percentual_icms_venda,
        outras_despesas_item: item.outras_despesas_item,
        percentual_ipi: item.percentual_ipi,
        percentual_comissao: item.percentual_comissao,
    }
}

fn assemble_detail(
    budget: Budget,
    items: Vec<BudgetItem>,
    config: &MarkupConfiguration,
) -> BudgetDetail {
    let items = items
        .into_iter()
        .map(|item| {
            let financials =
                calculate_item(&item_input_from_record(&item), config.commission_default);
            BudgetItemDetail { item, financials }
        })
        .collect();

    BudgetDetail {
        header: budget,
        items,
    }
}
