// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::budget::MarketPosition;

/// Configuração global de precificação. Persistida em linha única e
/// passada explicitamente como argumento para cada cálculo — os módulos de
/// cálculo nunca a leem como estado ambiente.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MarkupConfiguration {
    /// Janela de grampeamento do markup automático, em pontos percentuais.
    #[schema(example = "10")]
    pub minimum_markup_percentage: Decimal,

    #[schema(example = "300")]
    pub maximum_markup_percentage: Decimal,

    pub default_market_position: MarketPosition,

    /// ICMS de venda assumido quando o item não informa o seu.
    #[schema(example = "0.18")]
    pub icms_sale_default: Decimal,

    /// Comissão padrão (fração), ex.: 0.015 = 1,5%.
    #[schema(example = "0.015")]
    pub commission_default: Decimal,

    #[schema(example = "0.00")]
    pub other_expenses_default: Decimal,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for MarkupConfiguration {
    // Espelho dos defaults da migração, usado quando a linha ainda não
    // existe.
    fn default() -> Self {
        Self {
            minimum_markup_percentage: Decimal::from(10),
            maximum_markup_percentage: Decimal::from(300),
            default_market_position: MarketPosition::Competitive,
            icms_sale_default: Decimal::new(18, 2),
            commission_default: Decimal::new(15, 3),
            other_expenses_default: Decimal::ZERO,
            updated_at: None,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMarkupConfigurationRequest {
    #[schema(example = "15")]
    pub minimum_markup_percentage: Option<Decimal>,

    #[schema(example = "250")]
    pub maximum_markup_percentage: Option<Decimal>,

    pub default_market_position: Option<MarketPosition>,

    #[schema(example = "0.12")]
    pub icms_sale_default: Option<Decimal>,

    #[schema(example = "0.02")]
    pub commission_default: Option<Decimal>,

    pub other_expenses_default: Option<Decimal>,
}
