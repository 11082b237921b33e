// src/db/budget_repo.rs

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::budget::{Budget, BudgetItem, BudgetItemPayload, BudgetStatus},
    pricing::BudgetTotals,
};

// Repositório sem estado: cada método recebe o executor (pool ou
// transação) de quem chama.
#[derive(Clone, Default)]
pub struct BudgetRepository;

impl BudgetRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  NUMERAÇÃO
    // =========================================================================

    /// Consome o próximo número da sequência e formata o identificador
    /// legível. Buracos na numeração são aceitáveis.
    pub async fn next_order_number<'e, E>(&self, executor: E) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('budget_order_seq')")
            .fetch_one(executor)
            .await?;

        Ok(format!("ORC-{}-{:04}", Utc::now().year(), seq))
    }

    // =========================================================================
    //  ORÇAMENTOS (cabeçalho)
    // =========================================================================

    pub async fn insert_budget<'e, E>(
        &self,
        executor: E,
        order_number: &str,
        client_name: &str,
        minimum_margin_percentage: Decimal,
        target_market_position: crate::models::budget::MarketPosition,
        competitor_price: Option<Decimal>,
        market_reference_price: Option<Decimal>,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let budget = sqlx::query_as::<_, Budget>(
            r#"
            INSERT INTO budgets (
                order_number, client_name, minimum_margin_percentage,
                target_market_position, competitor_price, market_reference_price
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(order_number)
        .bind(client_name)
        .bind(minimum_margin_percentage)
        .bind(target_market_position)
        .bind(competitor_price)
        .bind(market_reference_price)
        .fetch_one(executor)
        .await?;

        Ok(budget)
    }

    pub async fn update_budget_header<'e, E>(
        &self,
        executor: E,
        budget_id: Uuid,
        client_name: &str,
        minimum_margin_percentage: Decimal,
        target_market_position: crate::models::budget::MarketPosition,
        competitor_price: Option<Decimal>,
        market_reference_price: Option<Decimal>,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let budget = sqlx::query_as::<_, Budget>(
            r#"
            UPDATE budgets SET
                client_name = $2,
                minimum_margin_percentage = $3,
                target_market_position = $4,
                competitor_price = $5,
                market_reference_price = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(budget_id)
        .bind(client_name)
        .bind(minimum_margin_percentage)
        .bind(target_market_position)
        .bind(competitor_price)
        .bind(market_reference_price)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::BudgetNotFound)?;

        Ok(budget)
    }

    /// Grava os campos derivados recalculados. Única via de escrita para
    /// eles: o cliente nunca envia totais.
    pub async fn update_totals<'e, E>(
        &self,
        executor: E,
        budget_id: Uuid,
        totals: &BudgetTotals,
        markup_percentage: Decimal,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let budget = sqlx::query_as::<_, Budget>(
            r#"
            UPDATE budgets SET
                total_purchase_value = $2,
                total_sale_net = $3,
                total_sale_gross = $4,
                total_taxes = $5,
                total_commission = $6,
                total_ipi_value = $7,
                total_final_value = $8,
                profitability_percentage = $9,
                markup_percentage = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(budget_id)
        .bind(totals.total_purchase_value)
        .bind(totals.total_sale_net)
        .bind(totals.total_sale_gross)
        .bind(totals.total_taxes)
        .bind(totals.total_commission)
        .bind(totals.total_ipi_value)
        .bind(totals.total_final_value)
        .bind(totals.profitability_percentage)
        .bind(markup_percentage)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::BudgetNotFound)?;

        Ok(budget)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        budget_id: Uuid,
        status: BudgetStatus,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let budget = sqlx::query_as::<_, Budget>(
            "UPDATE budgets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(budget_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::BudgetNotFound)?;

        Ok(budget)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        budget_id: Uuid,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Budget>("SELECT * FROM budgets WHERE id = $1")
            .bind(budget_id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::BudgetNotFound)
    }

    pub async fn list_budgets<'e, E>(&self, executor: E) -> Result<Vec<Budget>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let budgets =
            sqlx::query_as::<_, Budget>("SELECT * FROM budgets ORDER BY created_at DESC")
                .fetch_all(executor)
                .await?;
        Ok(budgets)
    }

    /// Exclusão definitiva; os itens caem em cascata.
    pub async fn delete_budget<'e, E>(&self, executor: E, budget_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(budget_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BudgetNotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        budget_id: Uuid,
        position: i32,
        payload: &BudgetItemPayload,
    ) -> Result<BudgetItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, BudgetItem>(
            r#"
            INSERT INTO budget_items (
                budget_id, position, description,
                peso_compra, peso_venda,
                valor_com_icms_compra, valor_com_icms_venda,
                percentual_icms_compra, percentual_icms_venda,
                outras_despesas_item, percentual_ipi, percentual_comissao,
                delivery_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(budget_id)
        .bind(position)
        .bind(&payload.description)
        .bind(payload.peso_compra)
        .bind(payload.peso_venda)
        .bind(payload.valor_com_icms_compra)
        .bind(payload.valor_com_icms_venda)
        .bind(payload.percentual_icms_compra)
        .bind(payload.percentual_icms_venda)
        .bind(payload.outras_despesas_item)
        .bind(payload.percentual_ipi)
        .bind(payload.percentual_comissao)
        .bind(&payload.delivery_time)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn list_items<'e, E>(
        &self,
        executor: E,
        budget_id: Uuid,
    ) -> Result<Vec<BudgetItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, BudgetItem>(
            "SELECT * FROM budget_items WHERE budget_id = $1 ORDER BY position ASC",
        )
        .bind(budget_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    pub async fn delete_items<'e, E>(&self, executor: E, budget_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM budget_items WHERE budget_id = $1")
            .bind(budget_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Reescreve o preço de venda de um item a partir do markup aplicado.
    pub async fn update_item_sale_value<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        valor_com_icms_venda: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE budget_items SET valor_com_icms_venda = $2 WHERE id = $1")
            .bind(item_id)
            .bind(valor_com_icms_venda)
            .execute(executor)
            .await?;
        Ok(())
    }
}
