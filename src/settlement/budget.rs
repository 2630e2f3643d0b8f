// src/settlement/budget.rs

use rust_decimal::Decimal;

use crate::models::expense::BudgetInfo;

/// Recusa se `current + candidate > budget`. Sem orçamento (ou zero) não há limite.
pub fn check_budget(
    category: &str,
    budget: Option<Decimal>,
    current_spending: Decimal,
    candidate: Decimal,
) -> Result<(), BudgetInfo> {
    let budget = match budget {
        Some(b) if b > Decimal::ZERO => b,
        _ => return Ok(()),
    };

    if current_spending + candidate > budget {
        return Err(BudgetInfo {
            category: category.to_string(),
            budget,
            current_spending,
            remaining: (budget - current_spending).max(Decimal::ZERO),
            requested_amount: candidate,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn accepts_up_to_the_exact_budget() {
        assert!(check_budget("transporte", Some(d(1000)), d(600), d(400)).is_ok());
    }

    #[test]
    fn rejects_when_spending_plus_request_exceeds() {
        let info = check_budget("transporte", Some(d(1000)), d(600), d(401)).unwrap_err();
        assert_eq!(
            info,
            BudgetInfo {
                category: "transporte".into(),
                budget: d(1000),
                current_spending: d(600),
                remaining: d(400),
                requested_amount: d(401),
            }
        );
    }

    #[test]
    fn missing_or_zero_budget_means_no_limit() {
        assert!(check_budget("outros", None, d(10_000), d(5_000)).is_ok());
        assert!(check_budget("outros", Some(Decimal::ZERO), d(10_000), d(5_000)).is_ok());
    }

    #[test]
    fn remaining_never_reported_below_zero() {
        let info = check_budget("hospedagem", Some(d(100)), d(150), d(1)).unwrap_err();
        assert_eq!(info.remaining, Decimal::ZERO);
    }
}
