//! Regras do acerto financeiro, sem acesso a banco.
//!
//! Os serviços carregam as linhas necessárias (dentro da transação quando a
//! operação escreve) e delegam a decisão para as funções daqui. Tudo que é
//! política numérica ou de estado mora neste módulo.

pub mod advance;
pub mod bonification;
pub mod book_size;
pub mod budget;
pub mod commission;
pub mod distribution;
pub mod netting;
pub mod report;
pub mod transitions;

use rust_decimal::{Decimal, RoundingStrategy};

/// `amount * percentage / 100`, arredondado em centavos.
pub fn apply_percentage(amount: Decimal, percentage: Decimal) -> Decimal {
    (amount * percentage / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_cents() {
        assert_eq!(apply_percentage(Decimal::new(150, 0), Decimal::new(50, 0)), Decimal::new(75, 0));
        // 33.33 * 15% = 4.9995 -> 5.00
        assert_eq!(
            apply_percentage(Decimal::new(3333, 2), Decimal::new(15, 0)),
            Decimal::new(500, 2)
        );
    }
}
