// src/pricing/taxes.rs

use rust_decimal::Decimal;

/// Alíquota combinada de PIS/COFINS: 9,25%, fixa para o sistema inteiro.
/// Não é configurável por item.
pub const PIS_COFINS_RATE: Decimal = Decimal::from_parts(925, 0, 0, false, 4);

/// Quantidade de casas decimais de valores monetários (centavos).
pub const DECIMAL_PLACES: u32 = 2;

/// Remove os impostos embutidos de um valor "com ICMS".
///
/// O preço listado já carrega o ICMS embutido; esta função devolve o valor
/// com ICMS e PIS/COFINS removidos:
///
/// `net = bruto * (1 - aliquota_icms) * (1 - PIS_COFINS_RATE)`
///
/// Pré-condição (garantida na validação dos payloads): `icms_rate` em
/// [0, 1] e `gross_with_icms >= 0`.
pub fn net_value(gross_with_icms: Decimal, icms_rate: Decimal) -> Decimal {
    gross_with_icms * (Decimal::ONE - icms_rate) * (Decimal::ONE - PIS_COFINS_RATE)
}

/// Operação inversa de `net_value`: reembute os impostos da ponta de venda
/// num valor líquido, produzindo o preço que o cliente paga.
///
/// Retorna `None` quando `icms_rate == 1` (divisor zero, preço
/// irrepresentável).
pub fn gross_value(net: Decimal, icms_rate: Decimal) -> Option<Decimal> {
    let divisor = (Decimal::ONE - icms_rate) * (Decimal::ONE - PIS_COFINS_RATE);
    if divisor.is_zero() {
        return None;
    }
    Some(net / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_rate_identity() {
        // Com ICMS zero sobra apenas o desconto de PIS/COFINS.
        assert_eq!(net_value(dec!(100), Decimal::ZERO), dec!(90.7500));
        assert_eq!(net_value(dec!(1), Decimal::ZERO), dec!(0.9075));
    }

    #[test]
    fn known_values() {
        // R$ 10,00 com 18% de ICMS: 10 * 0.82 * 0.9075 = 7.4415
        assert_eq!(net_value(dec!(10.00), dec!(0.18)), dec!(7.441500));
        // R$ 20,00 com 18% de ICMS
        assert_eq!(net_value(dec!(20.00), dec!(0.18)), dec!(14.883000));
    }

    #[test]
    fn monotonic_in_gross() {
        let rate = dec!(0.18);
        let mut last = net_value(Decimal::ZERO, rate);
        for gross in [dec!(0.01), dec!(1), dec!(10), dec!(99.99), dec!(1000)] {
            let net = net_value(gross, rate);
            assert!(net > last, "net_value deve crescer com o valor bruto");
            last = net;
        }
    }

    #[test]
    fn monotonic_decreasing_in_rate() {
        let gross = dec!(100);
        let mut last = net_value(gross, Decimal::ZERO);
        for rate in [dec!(0.04), dec!(0.07), dec!(0.12), dec!(0.18), dec!(0.25)] {
            let net = net_value(gross, rate);
            assert!(net < last, "net_value deve cair conforme a alíquota sobe");
            last = net;
        }
    }

    #[test]
    fn gross_value_inverts_net_value() {
        let gross = dec!(20.00);
        let rate = dec!(0.18);
        let net = net_value(gross, rate);
        let roundtrip = gross_value(net, rate).unwrap();
        assert_eq!(roundtrip.round_dp(4), dec!(20.0000));
    }

    #[test]
    fn gross_value_rejects_full_rate() {
        assert!(gross_value(dec!(10), Decimal::ONE).is_none());
    }
}
