// src/settlement/netting.rs

use rust_decimal::Decimal;

use crate::models::{earnings::Deductions, person::PersonType};

impl Deductions {
    /// Despesas aprovadas só descontam de líderes.
    pub fn for_person(
        person_type: PersonType,
        applied_charges: Decimal,
        approved_advances: Decimal,
        approved_expenses: Decimal,
    ) -> Self {
        let expenses = match person_type {
            PersonType::Leader => approved_expenses,
            PersonType::Colporter => Decimal::ZERO,
        };
        Self {
            charges: applied_charges,
            advances: approved_advances,
            expenses,
        }
    }

    pub fn total(&self) -> Decimal {
        self.charges + self.advances + self.expenses
    }
}

/// Líquido menos cobranças, adiantamentos e despesas. Pode ficar negativo.
pub fn settle(net: Decimal, deductions: &Deductions) -> Decimal {
    net - deductions.total()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn subtracts_each_sum_independently() {
        let deductions = Deductions::for_person(PersonType::Leader, d(10), d(20), d(5));
        assert_eq!(deductions.total(), d(35));
        assert_eq!(settle(d(100), &deductions), d(65));
    }

    #[test]
    fn colporters_do_not_pay_expenses() {
        let deductions = Deductions::for_person(PersonType::Colporter, d(10), d(0), d(500));
        assert_eq!(deductions.expenses, Decimal::ZERO);
        assert_eq!(settle(d(75), &deductions), d(65));
    }

    #[test]
    fn negative_result_is_not_clamped() {
        let deductions = Deductions::for_person(PersonType::Colporter, d(40), d(60), d(0));
        assert_eq!(settle(d(75), &deductions), d(-25));
    }
}
