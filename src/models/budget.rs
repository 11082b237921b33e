// src/models/budget.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::pricing::{BudgetTotals, ItemFinancials, MarkupResolution};

// --- ENUMS ---

// Mapeia o CREATE TYPE budget_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "budget_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Draft,    // Rascunho
    Pending,  // Aguardando aprovação
    Approved, // Aprovado
    Rejected, // Rejeitado
    Expired,  // Expirado
}

impl BudgetStatus {
    /// Matriz de transições do ciclo de vida. O servidor é o dono das
    /// transições; o cliente apenas exibe o campo.
    pub fn can_transition_to(self, next: BudgetStatus) -> bool {
        use BudgetStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Draft, Rejected)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Expired)
        )
    }
}

// Mapeia o CREATE TYPE market_position do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "market_position", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum MarketPosition {
    Budget,      // 5% abaixo do concorrente
    Competitive, // 2% acima
    Premium,     // 10% acima
}

// --- STRUCTS DE BANCO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Budget {
    pub id: Uuid,

    /// Identificador legível, gerado por sequência e imutável.
    #[schema(example = "ORC-2025-0042")]
    pub order_number: String,

    #[schema(example = "Metalúrgica Andrade Ltda")]
    pub client_name: String,

    pub status: BudgetStatus,

    #[schema(example = "20")]
    pub minimum_margin_percentage: Decimal,

    pub target_market_position: MarketPosition,

    #[schema(example = "185.00")]
    pub competitor_price: Option<Decimal>,
    pub market_reference_price: Option<Decimal>,

    #[schema(example = "100.00")]
    pub markup_percentage: Decimal,

    // Campos derivados. Nunca aceitos do cliente; recalculados pelo
    // servidor a cada escrita que afete custo.
    pub total_purchase_value: Decimal,
    pub total_sale_net: Decimal,
    pub total_sale_gross: Decimal,
    pub total_taxes: Decimal,
    pub total_commission: Decimal,
    pub total_ipi_value: Decimal,
    pub total_final_value: Decimal,
    pub profitability_percentage: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BudgetItem {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub position: i32,

    #[schema(example = "Bobina de aço galvanizado 0,65mm")]
    pub description: String,

    // Pesos em kg. Venda pode diferir da compra (quebra/perda).
    #[schema(example = "10.0")]
    pub peso_compra: Decimal,
    #[schema(example = "10.0")]
    pub peso_venda: Decimal,

    // Valores unitários brutos, com ICMS embutido
    #[schema(example = "10.00")]
    pub valor_com_icms_compra: Decimal,
    #[schema(example = "20.00")]
    pub valor_com_icms_venda: Decimal,

    // Alíquotas de ICMS em fração [0,1], independentes por ponta
    #[schema(example = "0.18")]
    pub percentual_icms_compra: Decimal,
    #[schema(example = "0.18")]
    pub percentual_icms_venda: Decimal,

    #[schema(example = "0.00")]
    pub outras_despesas_item: Decimal,

    // Faixa de IPI: 0, 0.0325 ou 0.05
    #[schema(example = "0.0325")]
    pub percentual_ipi: Decimal,

    pub percentual_comissao: Option<Decimal>,

    #[schema(example = "15")]
    pub delivery_time: String,

    pub created_at: DateTime<Utc>,
}

/// Orçamento completo: cabeçalho persistido + itens com o detalhamento
/// financeiro calculado sob a configuração vigente.
#[derive(Debug, Serialize, ToSchema)]
pub struct BudgetDetail {
    #[serde(flatten)]
    pub header: Budget,
    pub items: Vec<BudgetItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BudgetItemDetail {
    #[serde(flatten)]
    pub item: BudgetItem,
    pub financials: ItemFinancials,
}

// --- RESPOSTAS DE CÁLCULO (stateless) ---

#[derive(Debug, Serialize, ToSchema)]
pub struct BudgetCalculation {
    pub items: Vec<ItemFinancials>,
    #[serde(flatten)]
    pub totals: BudgetTotals,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AutoMarkupItemResult {
    /// Preço de venda com ICMS derivado do markup resolvido.
    #[schema(example = "20.00")]
    pub valor_com_icms_venda: Decimal,
    pub financials: ItemFinancials,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AutoMarkupCalculation {
    #[serde(flatten)]
    pub markup: MarkupResolution,
    pub items: Vec<AutoMarkupItemResult>,
    #[serde(flatten)]
    pub totals: BudgetTotals,
}

// --- VALIDADORES DE CAMPO ---

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_value"));
    }
    Ok(())
}

fn validate_monetary_minimum(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::new(1, 2) {
        // mínimo de R$ 0,01
        return Err(ValidationError::new("below_minimum_value"));
    }
    Ok(())
}

fn validate_rate_fraction(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value > Decimal::ONE {
        return Err(ValidationError::new("rate_out_of_range"));
    }
    Ok(())
}

/// IPI é uma faixa tabelada, não um percentual livre.
fn validate_ipi_tier(value: &Decimal) -> Result<(), ValidationError> {
    const TIERS: [Decimal; 3] = [
        Decimal::ZERO,
        Decimal::from_parts(325, 0, 0, false, 4),  // 3,25%
        Decimal::from_parts(5, 0, 0, false, 2),    // 5%
    ];
    if !TIERS.contains(value) {
        return Err(ValidationError::new("invalid_ipi_tier"));
    }
    Ok(())
}

fn validate_margin_below_hundred(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || *value >= Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("margin_out_of_range"));
    }
    Ok(())
}

fn default_delivery_time() -> String {
    "0".to_string()
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BudgetItemPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Bobina de aço galvanizado 0,65mm")]
    pub description: String,

    #[validate(custom(function = validate_non_negative))]
    #[schema(example = "10.0")]
    pub peso_compra: Decimal,

    #[validate(custom(function = validate_non_negative))]
    #[schema(example = "10.0")]
    pub peso_venda: Decimal,

    #[validate(custom(function = validate_monetary_minimum))]
    #[schema(example = "10.00")]
    pub valor_com_icms_compra: Decimal,

    #[validate(custom(function = validate_monetary_minimum))]
    #[schema(example = "20.00")]
    pub valor_com_icms_venda: Decimal,

    #[validate(custom(function = validate_rate_fraction))]
    #[schema(example = "0.18")]
    pub percentual_icms_compra: Decimal,

    #[validate(custom(function = validate_rate_fraction))]
    #[schema(example = "0.18")]
    pub percentual_icms_venda: Decimal,

    #[serde(default)]
    #[validate(custom(function = validate_non_negative))]
    #[schema(example = "0.00")]
    pub outras_despesas_item: Decimal,

    #[serde(default)]
    #[validate(custom(function = validate_ipi_tier))]
    #[schema(example = "0.0")]
    pub percentual_ipi: Decimal,

    #[validate(custom(function = validate_rate_fraction))]
    #[schema(example = "0.015")]
    pub percentual_comissao: Option<Decimal>,

    #[serde(default = "default_delivery_time")]
    #[schema(example = "15")]
    pub delivery_time: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBudgetPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Metalúrgica Andrade Ltda")]
    pub client_name: String,

    #[validate(custom(function = validate_margin_below_hundred))]
    #[schema(example = "20")]
    pub minimum_margin_percentage: Option<Decimal>,

    pub target_market_position: Option<MarketPosition>,

    #[validate(custom(function = validate_non_negative))]
    pub competitor_price: Option<Decimal>,

    #[validate(custom(function = validate_non_negative))]
    pub market_reference_price: Option<Decimal>,

    // Orçamento sem item não existe
    #[validate(length(min = 1, message = "at_least_one_item"), nested)]
    pub items: Vec<BudgetItemPayload>,
}

/// Atualização substitui os campos mutáveis e a lista de itens por inteiro;
/// `order_number` e `status` não passam por aqui.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBudgetPayload {
    #[validate(length(min = 1, message = "required"))]
    pub client_name: String,

    #[validate(custom(function = validate_margin_below_hundred))]
    pub minimum_margin_percentage: Option<Decimal>,

    pub target_market_position: Option<MarketPosition>,

    #[validate(custom(function = validate_non_negative))]
    pub competitor_price: Option<Decimal>,

    #[validate(custom(function = validate_non_negative))]
    pub market_reference_price: Option<Decimal>,

    #[validate(length(min = 1, message = "at_least_one_item"), nested)]
    pub items: Vec<BudgetItemPayload>,
}

/// Payload dos endpoints stateless de cálculo (completo e simplificado).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CalculateBudgetPayload {
    #[validate(length(min = 1, message = "at_least_one_item"), nested)]
    pub items: Vec<BudgetItemPayload>,
}

/// Item do fluxo de markup automático: só a ponta de compra é obrigatória.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AutoMarkupItemPayload {
    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    #[validate(custom(function = validate_non_negative))]
    #[schema(example = "10.0")]
    pub peso_compra: Decimal,

    /// Quando ausente, assume o peso de compra (sem quebra).
    #[validate(custom(function = validate_non_negative))]
    pub peso_venda: Option<Decimal>,

    #[validate(custom(function = validate_monetary_minimum))]
    #[schema(example = "10.00")]
    pub valor_com_icms_compra: Decimal,

    #[validate(custom(function = validate_rate_fraction))]
    #[schema(example = "0.18")]
    pub percentual_icms_compra: Decimal,

    /// Quando ausente, assume o ICMS de venda padrão da configuração.
    #[validate(custom(function = validate_rate_fraction))]
    pub percentual_icms_venda: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = validate_non_negative))]
    pub outras_despesas_item: Decimal,

    #[serde(default)]
    #[validate(custom(function = validate_ipi_tier))]
    pub percentual_ipi: Decimal,

    #[validate(custom(function = validate_rate_fraction))]
    pub percentual_comissao: Option<Decimal>,

    #[serde(default = "default_delivery_time")]
    pub delivery_time: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AutoMarkupBudgetPayload {
    #[validate(custom(function = validate_margin_below_hundred))]
    #[schema(example = "20")]
    pub minimum_margin_percentage: Option<Decimal>,

    pub target_market_position: Option<MarketPosition>,

    #[validate(custom(function = validate_non_negative))]
    #[schema(example = "185.00")]
    pub competitor_price: Option<Decimal>,

    #[validate(custom(function = validate_non_negative))]
    pub market_reference_price: Option<Decimal>,

    #[validate(length(min = 1, message = "at_least_one_item"), nested)]
    pub items: Vec<AutoMarkupItemPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: BudgetStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ApplyMarkupParams {
    /// Markup em pontos percentuais a aplicar sobre o custo de cada item.
    pub markup_percentage: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NextOrderNumberResponse {
    #[schema(example = "ORC-2025-0042")]
    pub order_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_transition_matrix() {
        use BudgetStatus::*;

        assert!(Draft.can_transition_to(Pending));
        assert!(Draft.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Expired));

        // Estados terminais não saem do lugar
        assert!(!Approved.can_transition_to(Draft));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Expired.can_transition_to(Approved));
        // Nem pular etapas
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Draft.can_transition_to(Expired));
    }

    #[test]
    fn ipi_tier_validation() {
        assert!(validate_ipi_tier(&dec!(0)).is_ok());
        assert!(validate_ipi_tier(&dec!(0.0325)).is_ok());
        assert!(validate_ipi_tier(&dec!(0.05)).is_ok());

        assert!(validate_ipi_tier(&dec!(0.04)).is_err());
        assert!(validate_ipi_tier(&dec!(0.1)).is_err());
    }

    #[test]
    fn icms_rate_bounds() {
        assert!(validate_rate_fraction(&dec!(0)).is_ok());
        assert!(validate_rate_fraction(&dec!(1)).is_ok());
        assert!(validate_rate_fraction(&dec!(-0.01)).is_err());
        assert!(validate_rate_fraction(&dec!(1.01)).is_err());
    }

    #[test]
    fn payload_rejects_empty_items() {
        let payload = CalculateBudgetPayload { items: vec![] };
        assert!(payload.validate().is_err());
    }
}
