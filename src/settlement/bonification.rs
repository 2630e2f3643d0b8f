// src/settlement/bonification.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::bonification::{BonificationProgress, NextTarget, Tier, TierProgress};

pub const SILVER_HOURS: Decimal = Decimal::from_parts(280, 0, 0, false, 0);
pub const SILVER_AMOUNT: Decimal = Decimal::from_parts(3480, 0, 0, false, 0);
pub const GOLD_HOURS: Decimal = Decimal::from_parts(320, 0, 0, false, 0);
pub const GOLD_AMOUNT: Decimal = Decimal::from_parts(4800, 0, 0, false, 0);

impl Tier {
    pub fn thresholds(self) -> (Decimal, Decimal) {
        match self {
            Tier::Silver => (SILVER_HOURS, SILVER_AMOUNT),
            Tier::Gold => (GOLD_HOURS, GOLD_AMOUNT),
        }
    }
}

fn progress_percent(value: Decimal, required: Decimal) -> Decimal {
    if required <= Decimal::ZERO {
        return Decimal::ONE_HUNDRED;
    }
    (value.max(Decimal::ZERO) * Decimal::ONE_HUNDRED / required)
        .min(Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn tier_progress(tier: Tier, hours_worked: Decimal, net_amount: Decimal) -> TierProgress {
    let (required_hours, required_amount) = tier.thresholds();

    TierProgress {
        tier,
        required_hours,
        required_amount,
        hours_progress: progress_percent(hours_worked, required_hours),
        amount_progress: progress_percent(net_amount, required_amount),
        remaining_hours: (required_hours - hours_worked).max(Decimal::ZERO),
        remaining_amount: (required_amount - net_amount).max(Decimal::ZERO),
        achieved: hours_worked >= required_hours && net_amount >= required_amount,
    }
}

/// As duas condições (horas e valor) precisam ser atingidas em cada nível.
pub fn evaluate(hours_worked: Decimal, net_amount: Decimal) -> BonificationProgress {
    let silver = tier_progress(Tier::Silver, hours_worked, net_amount);
    let gold = tier_progress(Tier::Gold, hours_worked, net_amount);

    let next_target = if gold.achieved {
        NextTarget::Completed
    } else if silver.achieved {
        NextTarget::Gold
    } else {
        NextTarget::Silver
    };

    BonificationProgress {
        hours_worked,
        net_amount,
        silver,
        gold,
        next_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[test]
    fn silver_reached_gold_pending() {
        let p = evaluate(d(300), d(4000));

        assert!(p.silver.achieved);
        assert!(!p.gold.achieved);
        assert_eq!(p.next_target, NextTarget::Gold);

        assert_eq!(p.silver.hours_progress, d(100));
        assert_eq!(p.silver.remaining_hours, Decimal::ZERO);
        assert_eq!(p.gold.remaining_hours, d(20));
        assert_eq!(p.gold.remaining_amount, d(800));
        // 300 / 320 = 93.75%
        assert_eq!(p.gold.hours_progress, Decimal::new(9375, 2));
    }

    #[test]
    fn both_conditions_are_required() {
        // horas de ouro, valor abaixo de prata
        let p = evaluate(d(400), d(3000));
        assert!(!p.silver.achieved);
        assert!(!p.gold.achieved);
        assert_eq!(p.next_target, NextTarget::Silver);
        assert_eq!(p.silver.hours_progress, d(100));
    }

    #[test]
    fn gold_completes_the_program() {
        let p = evaluate(d(320), d(4800));
        assert!(p.silver.achieved);
        assert!(p.gold.achieved);
        assert_eq!(p.next_target, NextTarget::Completed);
    }

    #[test]
    fn progress_is_capped_and_never_negative() {
        let p = evaluate(d(1000), d(-50));
        assert_eq!(p.gold.hours_progress, d(100));
        assert_eq!(p.gold.amount_progress, Decimal::ZERO);
        assert_eq!(p.silver.remaining_amount, Decimal::new(3530, 0));
    }

    #[test]
    fn exact_thresholds_count() {
        let p = evaluate(d(280), d(3480));
        assert!(p.silver.achieved);
        assert_eq!(p.next_target, NextTarget::Gold);
    }
}
