// src/pricing/markup.rs

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::item::round_percent;
use super::taxes::gross_value;
use crate::models::budget::MarketPosition;
use crate::models::settings::MarkupConfiguration;

/// Fator de preço de cada posicionamento em relação ao preço do
/// concorrente: 5% abaixo, 2% acima, 10% acima. Constantes de política,
/// espelhadas no texto do formulário.
fn position_factor(position: MarketPosition) -> Decimal {
    match position {
        MarketPosition::Budget => Decimal::from_parts(95, 0, 0, false, 2),
        MarketPosition::Competitive => Decimal::from_parts(102, 0, 0, false, 2),
        MarketPosition::Premium => Decimal::from_parts(110, 0, 0, false, 2),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    /// Margem mínima >= 100% torna o piso de preço irrepresentável
    /// (custo / (1 - m) explode).
    #[error("margem mínima de {0}% não tem preço de venda que a satisfaça")]
    UnsatisfiableMargin(Decimal),
}

/// Entradas da resolução automática de markup.
#[derive(Debug, Clone)]
pub struct MarkupInputs<'a> {
    pub total_purchase_value: Decimal,
    /// Piso de margem sobre a receita, em pontos percentuais (ex.: 20).
    pub minimum_margin_percentage: Decimal,
    pub target_market_position: MarketPosition,
    pub competitor_price: Option<Decimal>,
    /// Âncora de mercado usada quando não há preço de concorrente.
    pub market_reference_price: Option<Decimal>,
    pub config: &'a MarkupConfiguration,
}

/// Resultado da resolução: o markup final e se os limites da configuração
/// foram acionados.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MarkupResolution {
    #[schema(example = "100.00")]
    pub markup_percentage: Decimal,
    pub minimum_markup_applied: bool,
    pub maximum_markup_applied: bool,
}

/// Resolve o markup quando o usuário não fixou preço de venda.
///
/// Política de resolução:
///
/// 1. Preço piso pela margem mínima sobre a receita:
///    `piso = custo / (1 - margem/100)`.
/// 2. Havendo âncora (concorrente, senão referência de mercado), o preço
///    alvo é `âncora * fator` do posicionamento.
/// 3. Candidato = `max(piso, alvo)` — o mercado nunca empurra o preço para
///    baixo do piso de margem.
/// 4. Markup = `(candidato - custo) / custo * 100`, grampeado em
///    `[minimum_markup_percentage, maximum_markup_percentage]`.
///
/// Invariante: o markup retornado está sempre dentro da janela da
/// configuração. Custo zero resolve direto para o mínimo configurado.
pub fn resolve_markup(inputs: &MarkupInputs<'_>) -> Result<MarkupResolution, MarkupError> {
    let config = inputs.config;

    if inputs.minimum_margin_percentage >= Decimal::ONE_HUNDRED {
        return Err(MarkupError::UnsatisfiableMargin(
            inputs.minimum_margin_percentage,
        ));
    }

    let cost = inputs.total_purchase_value;
    if cost.is_zero() {
        return Ok(MarkupResolution {
            markup_percentage: config.minimum_markup_percentage,
            minimum_markup_applied: true,
            maximum_markup_applied: false,
        });
    }

    let margin_fraction = inputs.minimum_margin_percentage / Decimal::ONE_HUNDRED;
    let floor_price = cost / (Decimal::ONE - margin_fraction);

    let anchor = inputs.competitor_price.or(inputs.market_reference_price);
    let candidate_price = match anchor {
        Some(anchor_price) => {
            let target_price = anchor_price * position_factor(inputs.target_market_position);
            target_price.max(floor_price)
        }
        None => floor_price,
    };

    let raw_markup = round_percent((candidate_price - cost) / cost * Decimal::ONE_HUNDRED);

    let minimum_markup_applied = raw_markup < config.minimum_markup_percentage;
    let maximum_markup_applied = raw_markup > config.maximum_markup_percentage;
    let markup_percentage = raw_markup
        .max(config.minimum_markup_percentage)
        .min(config.maximum_markup_percentage);

    Ok(MarkupResolution {
        markup_percentage,
        minimum_markup_applied,
        maximum_markup_applied,
    })
}

/// Deriva o valor de venda com ICMS de um item a partir do custo líquido e
/// do markup resolvido: aplica o markup sobre o custo e reembute os
/// impostos da ponta de venda.
///
/// `None` quando `icms_venda == 1` (impossível reembutir).
pub fn sale_gross_from_markup(
    purchase_unit_net: Decimal,
    markup_percentage: Decimal,
    icms_venda: Decimal,
) -> Option<Decimal> {
    let sale_unit_net =
        purchase_unit_net * (Decimal::ONE + markup_percentage / Decimal::ONE_HUNDRED);
    gross_value(sale_unit_net, icms_venda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::taxes::net_value;
    use rust_decimal_macros::dec;

    fn config() -> MarkupConfiguration {
        MarkupConfiguration {
            minimum_markup_percentage: dec!(10),
            maximum_markup_percentage: dec!(300),
            default_market_position: MarketPosition::Competitive,
            icms_sale_default: dec!(0.18),
            commission_default: dec!(0.015),
            other_expenses_default: Decimal::ZERO,
            updated_at: None,
        }
    }

    fn inputs<'a>(config: &'a MarkupConfiguration) -> MarkupInputs<'a> {
        MarkupInputs {
            total_purchase_value: dec!(100),
            minimum_margin_percentage: dec!(20),
            target_market_position: MarketPosition::Competitive,
            competitor_price: None,
            market_reference_price: None,
            config,
        }
    }

    #[test]
    fn floor_only_when_no_anchor() {
        let config = config();
        let resolution = resolve_markup(&inputs(&config)).unwrap();

        // piso = 100 / 0.8 = 125 -> markup 25%
        assert_eq!(resolution.markup_percentage, dec!(25.00));
        assert!(!resolution.minimum_markup_applied);
        assert!(!resolution.maximum_markup_applied);
    }

    #[test]
    fn anchor_above_floor_wins() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.competitor_price = Some(dec!(200));
        inputs.target_market_position = MarketPosition::Premium;

        let resolution = resolve_markup(&inputs).unwrap();

        // alvo = 200 * 1.10 = 220 > piso 125 -> markup 120%
        assert_eq!(resolution.markup_percentage, dec!(120.00));
    }

    #[test]
    fn anchor_below_floor_keeps_floor() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.competitor_price = Some(dec!(90));
        inputs.target_market_position = MarketPosition::Budget;

        let resolution = resolve_markup(&inputs).unwrap();

        // alvo = 90 * 0.95 = 85.5 < piso 125: a margem mínima prevalece
        assert_eq!(resolution.markup_percentage, dec!(25.00));
    }

    #[test]
    fn reference_price_is_fallback_anchor() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.market_reference_price = Some(dec!(200));

        let resolution = resolve_markup(&inputs).unwrap();

        // referência * 1.02 = 204 -> markup 104%
        assert_eq!(resolution.markup_percentage, dec!(104.00));
    }

    #[test]
    fn competitor_price_beats_reference_price() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.competitor_price = Some(dec!(150));
        inputs.market_reference_price = Some(dec!(500));

        let resolution = resolve_markup(&inputs).unwrap();

        // concorrente * 1.02 = 153 -> markup 53%
        assert_eq!(resolution.markup_percentage, dec!(53.00));
    }

    #[test]
    fn clamps_to_minimum() {
        let mut config = config();
        config.minimum_markup_percentage = dec!(40);
        let resolution = resolve_markup(&inputs(&config)).unwrap();

        // markup cru de 25% fica abaixo do mínimo configurado
        assert_eq!(resolution.markup_percentage, dec!(40));
        assert!(resolution.minimum_markup_applied);
        assert!(!resolution.maximum_markup_applied);
    }

    #[test]
    fn clamps_to_maximum() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.competitor_price = Some(dec!(10000));

        let resolution = resolve_markup(&inputs).unwrap();

        assert_eq!(resolution.markup_percentage, dec!(300));
        assert!(resolution.maximum_markup_applied);
    }

    #[test]
    fn markup_always_inside_clamp_window() {
        let config = config();
        for (cost, margin, competitor) in [
            (dec!(1), dec!(0), None),
            (dec!(100), dec!(99), None),
            (dec!(100), dec!(20), Some(dec!(0.01))),
            (dec!(0.01), dec!(50), Some(dec!(99999))),
            (dec!(5000), dec!(5), Some(dec!(1))),
        ] {
            let resolution = resolve_markup(&MarkupInputs {
                total_purchase_value: cost,
                minimum_margin_percentage: margin,
                target_market_position: MarketPosition::Premium,
                competitor_price: competitor,
                market_reference_price: None,
                config: &config,
            })
            .unwrap();

            assert!(resolution.markup_percentage >= config.minimum_markup_percentage);
            assert!(resolution.markup_percentage <= config.maximum_markup_percentage);
        }
    }

    #[test]
    fn zero_cost_resolves_to_minimum() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.total_purchase_value = Decimal::ZERO;

        let resolution = resolve_markup(&inputs).unwrap();

        assert_eq!(resolution.markup_percentage, config.minimum_markup_percentage);
        assert!(resolution.minimum_markup_applied);
    }

    #[test]
    fn full_margin_is_rejected() {
        let config = config();
        let mut inputs = inputs(&config);
        inputs.minimum_margin_percentage = dec!(100);

        assert_eq!(
            resolve_markup(&inputs),
            Err(MarkupError::UnsatisfiableMargin(dec!(100)))
        );
    }

    #[test]
    fn derived_sale_price_preserves_markup() {
        // Reembutir impostos e recalcular o líquido devolve o custo com o
        // markup aplicado.
        let purchase_unit_net = dec!(7.44);
        let markup = dec!(100);
        let icms = dec!(0.18);

        let gross = sale_gross_from_markup(purchase_unit_net, markup, icms).unwrap();
        let net_again = net_value(gross, icms);

        assert_eq!(net_again.round_dp(2), dec!(14.88));
    }

    #[test]
    fn derived_sale_price_rejects_full_icms() {
        assert!(sale_gross_from_markup(dec!(10), dec!(50), Decimal::ONE).is_none());
    }
}
