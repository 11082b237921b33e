// src/pricing/item.rs

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

use super::taxes::{net_value, DECIMAL_PLACES};

/// Arredonda para centavos (half-up).
#[inline]
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Arredonda percentuais derivados (2 casas).
#[inline]
pub(crate) fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Entrada de cálculo de um item do orçamento.
///
/// `peso_compra` e `peso_venda` podem divergir: a diferença de peso
/// (quebra/perda no beneficiamento) afeta o total de venda de forma
/// independente do efeito de preço.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub peso_compra: Decimal,
    pub peso_venda: Decimal,
    pub valor_com_icms_compra: Decimal,
    pub valor_com_icms_venda: Decimal,
    pub percentual_icms_compra: Decimal,
    pub percentual_icms_venda: Decimal,
    pub outras_despesas_item: Decimal,
    pub percentual_ipi: Decimal,
    /// Comissão específica do item; quando ausente vale o padrão da
    /// configuração.
    pub percentual_comissao: Option<Decimal>,
}

/// Resultado financeiro de um item.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemFinancials {
    /// Custo líquido por kg: valor de compra sem impostos + outras despesas.
    #[schema(example = "7.44")]
    pub purchase_unit_net: Decimal,
    /// Receita líquida por kg (venda sem impostos).
    #[schema(example = "14.88")]
    pub sale_unit_net: Decimal,
    #[schema(example = "74.40")]
    pub purchase_total: Decimal,
    #[schema(example = "148.80")]
    pub sale_total_net: Decimal,
    /// O que o cliente paga (peso de venda x valor com ICMS).
    #[schema(example = "200.00")]
    pub sale_total_gross: Decimal,
    #[schema(example = "0.00")]
    pub ipi_value: Decimal,
    /// Valor final do item: venda bruta + IPI.
    #[schema(example = "200.00")]
    pub total_with_ipi: Decimal,
    #[schema(example = "2.23")]
    pub commission_value: Decimal,
    #[schema(example = "50.00")]
    pub profitability_percentage: Decimal,
}

/// Calcula o resultado financeiro de um item.
///
/// Valores unitários líquidos são arredondados para centavos antes da
/// multiplicação pelo peso; assim os totais por item somam de forma exata
/// no agregador.
///
/// Bases de cálculo:
/// - IPI incide sobre o total bruto de venda (o preço que o cliente paga);
/// - comissão incide sobre o total líquido de venda;
/// - `outras_despesas_item` entra no custo sem ajuste fiscal.
pub fn calculate_item(input: &ItemInput, commission_default: Decimal) -> ItemFinancials {
    let purchase_unit_net = round_money(
        net_value(input.valor_com_icms_compra, input.percentual_icms_compra)
            + input.outras_despesas_item,
    );
    let sale_unit_net = round_money(net_value(
        input.valor_com_icms_venda,
        input.percentual_icms_venda,
    ));

    let purchase_total = round_money(input.peso_compra * purchase_unit_net);
    let sale_total_net = round_money(input.peso_venda * sale_unit_net);
    let sale_total_gross = round_money(input.peso_venda * input.valor_com_icms_venda);

    let ipi_value = round_money(sale_total_gross * input.percentual_ipi);
    let total_with_ipi = sale_total_gross + ipi_value;

    let commission_rate = input.percentual_comissao.unwrap_or(commission_default);
    let commission_value = round_money(sale_total_net * commission_rate);

    // Formulário parcialmente preenchido não pode derrubar o preview:
    // venda zerada rende rentabilidade 0, nunca divisão por zero.
    let profitability_percentage = if sale_total_net.is_zero() {
        Decimal::ZERO
    } else {
        round_percent(
            (sale_total_net - purchase_total) / sale_total_net * Decimal::ONE_HUNDRED,
        )
    };

    ItemFinancials {
        purchase_unit_net,
        sale_unit_net,
        purchase_total,
        sale_total_net,
        sale_total_gross,
        ipi_value,
        total_with_ipi,
        commission_value,
        profitability_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_item() -> ItemInput {
        // Cenário de referência: 10kg comprados a R$ 10,00/kg bruto (18% de
        // ICMS), vendidos a R$ 20,00/kg bruto (18% de ICMS), sem IPI.
        ItemInput {
            peso_compra: dec!(10),
            peso_venda: dec!(10),
            valor_com_icms_compra: dec!(10.00),
            valor_com_icms_venda: dec!(20.00),
            percentual_icms_compra: dec!(0.18),
            percentual_icms_venda: dec!(0.18),
            outras_despesas_item: Decimal::ZERO,
            percentual_ipi: Decimal::ZERO,
            percentual_comissao: None,
        }
    }

    #[test]
    fn reference_scenario() {
        let result = calculate_item(&base_item(), dec!(0.015));

        assert_eq!(result.purchase_unit_net, dec!(7.44));
        assert_eq!(result.sale_unit_net, dec!(14.88));
        assert_eq!(result.purchase_total, dec!(74.40));
        assert_eq!(result.sale_total_net, dec!(148.80));
        assert_eq!(result.sale_total_gross, dec!(200.00));
        assert_eq!(result.ipi_value, dec!(0.00));
        assert_eq!(result.total_with_ipi, dec!(200.00));
        assert_eq!(result.commission_value, dec!(2.23));
        assert_eq!(result.profitability_percentage, dec!(50.00));
    }

    #[test]
    fn weight_difference_scales_sale_only() {
        // Mesmos preços, mas 1kg de quebra: o total de venda escala por 9,
        // o de compra continua por 10.
        let mut item = base_item();
        item.peso_venda = dec!(9);

        let result = calculate_item(&item, dec!(0.015));

        assert_eq!(result.purchase_total, dec!(74.40));
        assert_eq!(result.sale_total_net, dec!(133.92));
        assert_eq!(result.sale_total_gross, dec!(180.00));
    }

    #[test]
    fn other_expenses_enter_cost_without_tax_adjustment() {
        let mut item = base_item();
        item.outras_despesas_item = dec!(1.00);

        let result = calculate_item(&item, dec!(0.015));

        // 7.4415 + 1.00 = 8.4415 -> 8.44
        assert_eq!(result.purchase_unit_net, dec!(8.44));
        assert_eq!(result.purchase_total, dec!(84.40));
    }

    #[test]
    fn ipi_is_charged_on_gross_sale() {
        let mut item = base_item();
        item.percentual_ipi = dec!(0.05);

        let result = calculate_item(&item, dec!(0.015));

        // 5% sobre os R$ 200,00 brutos
        assert_eq!(result.ipi_value, dec!(10.00));
        assert_eq!(result.total_with_ipi, dec!(210.00));
    }

    #[test]
    fn per_item_commission_overrides_default() {
        let mut item = base_item();
        item.percentual_comissao = Some(dec!(0.03));

        let result = calculate_item(&item, dec!(0.015));

        // 3% de 148.80
        assert_eq!(result.commission_value, dec!(4.46));
    }

    #[test]
    fn zero_sale_yields_zero_profitability() {
        let mut item = base_item();
        item.valor_com_icms_venda = Decimal::ZERO;
        item.peso_venda = Decimal::ZERO;

        let result = calculate_item(&item, dec!(0.015));

        assert_eq!(result.profitability_percentage, Decimal::ZERO);
        assert_eq!(result.commission_value, Decimal::ZERO);
    }
}
