// src/settlement/advance.rs

use rust_decimal::Decimal;

use crate::{
    models::{person::PersonType, program::ProgramFinancialConfig},
    settlement::apply_percentage,
};

/// Percentual máximo de adiantamento sobre as vendas da semana.
pub fn cap_percentage(
    person_type: PersonType,
    config: Option<&ProgramFinancialConfig>,
    default_percentage: Decimal,
) -> Decimal {
    match (person_type, config) {
        (PersonType::Colporter, Some(c)) => c.colporter_cash_advance_percentage,
        (PersonType::Leader, Some(c)) => c.leader_cash_advance_percentage,
        (_, None) => default_percentage,
    }
}

/// Valor máximo que pode ser adiantado.
pub fn advance_limit(weekly_sales: Decimal, cap_percentage: Decimal) -> Decimal {
    apply_percentage(weekly_sales, cap_percentage).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_follows_person_type() {
        let cfg = ProgramFinancialConfig {
            program_id: 1,
            colporter_percentage: Decimal::new(50, 0),
            leader_percentage: Decimal::new(15, 0),
            colporter_cash_advance_percentage: Decimal::new(20, 0),
            leader_cash_advance_percentage: Decimal::new(30, 0),
            allow_budget_override: false,
        };
        let default = Decimal::new(10, 0);

        assert_eq!(cap_percentage(PersonType::Colporter, Some(&cfg), default), Decimal::new(20, 0));
        assert_eq!(cap_percentage(PersonType::Leader, Some(&cfg), default), Decimal::new(30, 0));
        assert_eq!(cap_percentage(PersonType::Leader, None, default), default);

        assert_eq!(advance_limit(Decimal::new(900, 0), Decimal::new(20, 0)), Decimal::new(180, 0));
    }

    #[test]
    fn no_sales_means_no_advance() {
        assert_eq!(advance_limit(Decimal::ZERO, Decimal::new(20, 0)), Decimal::ZERO);
    }
}
