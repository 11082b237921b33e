// src/pricing/aggregate.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::item::{round_percent, ItemFinancials};

/// Totais consolidados de um orçamento.
///
/// Dois totais de venda convivem de propósito: `total_sale_net` (sem ICMS e
/// PIS/COFINS, base dos percentuais) e `total_sale_gross` (o que o cliente
/// paga). Não existe um campo ambíguo "total_sale_value".
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BudgetTotals {
    #[schema(example = "74.40")]
    pub total_purchase_value: Decimal,
    #[schema(example = "148.80")]
    pub total_sale_net: Decimal,
    #[schema(example = "200.00")]
    pub total_sale_gross: Decimal,
    /// Impostos embutidos na venda (bruto - líquido).
    #[schema(example = "51.20")]
    pub total_taxes: Decimal,
    #[schema(example = "2.23")]
    pub total_commission: Decimal,
    #[schema(example = "0.00")]
    pub total_ipi_value: Decimal,
    /// Venda bruta + IPI: o valor final da proposta.
    #[schema(example = "200.00")]
    pub total_final_value: Decimal,
    /// Margem sobre a receita: (venda - custo) / venda.
    #[schema(example = "50.00")]
    pub profitability_percentage: Decimal,
    /// Margem sobre o custo: (venda - custo) / custo.
    #[schema(example = "100.00")]
    pub markup_percentage: Decimal,
}

/// Soma os resultados por item e deriva os percentuais do orçamento.
///
/// Não há interação entre itens no modelo de custo: o total de um orçamento
/// [A, B] é a soma dos totais de [A] e [B].
///
/// Orçamento com venda ou compra zerada produz percentuais 0 em vez de
/// erro, para o preview continuar funcionando com formulários parciais.
pub fn aggregate(items: &[ItemFinancials]) -> BudgetTotals {
    let mut total_purchase_value = Decimal::ZERO;
    let mut total_sale_net = Decimal::ZERO;
    let mut total_sale_gross = Decimal::ZERO;
    let mut total_commission = Decimal::ZERO;
    let mut total_ipi_value = Decimal::ZERO;

    for item in items {
        total_purchase_value += item.purchase_total;
        total_sale_net += item.sale_total_net;
        total_sale_gross += item.sale_total_gross;
        total_commission += item.commission_value;
        total_ipi_value += item.ipi_value;
    }

    let total_taxes = total_sale_gross - total_sale_net;
    let total_final_value = total_sale_gross + total_ipi_value;

    let profitability_percentage = if total_sale_net.is_zero() {
        Decimal::ZERO
    } else {
        round_percent(
            (total_sale_net - total_purchase_value) / total_sale_net * Decimal::ONE_HUNDRED,
        )
    };

    let markup_percentage = if total_purchase_value.is_zero() {
        Decimal::ZERO
    } else {
        round_percent(
            (total_sale_net - total_purchase_value) / total_purchase_value
                * Decimal::ONE_HUNDRED,
        )
    };

    BudgetTotals {
        total_purchase_value,
        total_sale_net,
        total_sale_gross,
        total_taxes,
        total_commission,
        total_ipi_value,
        total_final_value,
        profitability_percentage,
        markup_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::item::{calculate_item, ItemInput};
    use rust_decimal_macros::dec;

    fn item(gross_compra: Decimal, gross_venda: Decimal, peso: Decimal) -> ItemInput {
        ItemInput {
            peso_compra: peso,
            peso_venda: peso,
            valor_com_icms_compra: gross_compra,
            valor_com_icms_venda: gross_venda,
            percentual_icms_compra: dec!(0.18),
            percentual_icms_venda: dec!(0.18),
            outras_despesas_item: Decimal::ZERO,
            percentual_ipi: Decimal::ZERO,
            percentual_comissao: None,
        }
    }

    const COMMISSION: Decimal = Decimal::from_parts(15, 0, 0, false, 3); // 1,5%

    #[test]
    fn reference_scenario_totals() {
        let items = [calculate_item(&item(dec!(10), dec!(20), dec!(10)), COMMISSION)];
        let totals = aggregate(&items);

        assert_eq!(totals.total_purchase_value, dec!(74.40));
        assert_eq!(totals.total_sale_net, dec!(148.80));
        assert_eq!(totals.total_sale_gross, dec!(200.00));
        assert_eq!(totals.total_taxes, dec!(51.20));
        assert_eq!(totals.total_final_value, dec!(200.00));
        assert_eq!(totals.profitability_percentage, dec!(50.00));
        assert_eq!(totals.markup_percentage, dec!(100.00));
    }

    #[test]
    fn aggregation_is_additive() {
        let a = calculate_item(&item(dec!(10), dec!(20), dec!(10)), COMMISSION);
        let b = calculate_item(&item(dec!(7.50), dec!(13.30), dec!(3.5)), COMMISSION);

        let combined = aggregate(&[a.clone(), b.clone()]);
        let only_a = aggregate(&[a]);
        let only_b = aggregate(&[b]);

        assert_eq!(
            combined.total_purchase_value,
            only_a.total_purchase_value + only_b.total_purchase_value
        );
        assert_eq!(
            combined.total_sale_net,
            only_a.total_sale_net + only_b.total_sale_net
        );
        assert_eq!(
            combined.total_commission,
            only_a.total_commission + only_b.total_commission
        );
        assert_eq!(
            combined.total_ipi_value,
            only_a.total_ipi_value + only_b.total_ipi_value
        );
    }

    #[test]
    fn zero_budget_is_safe() {
        // Tudo zerado: percentuais devem ser 0, nunca NaN nem panic.
        let items = [calculate_item(
            &item(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            COMMISSION,
        )];
        let totals = aggregate(&items);

        assert_eq!(totals.profitability_percentage, Decimal::ZERO);
        assert_eq!(totals.markup_percentage, Decimal::ZERO);
        assert_eq!(totals.total_final_value, Decimal::ZERO);
    }

    #[test]
    fn empty_slice_aggregates_to_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals.total_purchase_value, Decimal::ZERO);
        assert_eq!(totals.markup_percentage, Decimal::ZERO);
    }

    #[test]
    fn weight_difference_lowers_sale_totals() {
        let equal = calculate_item(&item(dec!(10), dec!(20), dec!(10)), COMMISSION);

        let mut less_sold = item(dec!(10), dec!(20), dec!(10));
        less_sold.peso_venda = dec!(9);
        let with_loss = calculate_item(&less_sold, COMMISSION);

        let equal_totals = aggregate(&[equal]);
        let loss_totals = aggregate(&[with_loss]);

        assert_eq!(loss_totals.total_purchase_value, equal_totals.total_purchase_value);
        assert!(loss_totals.total_sale_net < equal_totals.total_sale_net);
        assert_eq!(loss_totals.total_sale_net, dec!(133.92));
    }
}
