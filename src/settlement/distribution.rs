// src/settlement/distribution.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::settlement::apply_percentage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetKeyword {
    Program,
}

/// Destino de uma fatia: o id de um líder ou a palavra "program".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DistributionTarget {
    Leader(i64),
    Keyword(TargetKeyword),
}

impl DistributionTarget {
    pub fn leader_id(self) -> Option<i64> {
        match self {
            DistributionTarget::Leader(id) => Some(id),
            DistributionTarget::Keyword(TargetKeyword::Program) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncentiveShare {
    #[schema(value_type = Object, example = 12)]
    pub leader_id: DistributionTarget,
    #[schema(example = "4200.00")]
    pub total_sales: Decimal,
    #[schema(example = "5.00")]
    pub percentage: Decimal,
    /// Se omitido, `totalSales * percentage / 100`.
    #[schema(example = "210.00")]
    pub incentive_amount: Option<Decimal>,
}

impl IncentiveShare {
    pub fn resolved_amount(&self) -> Decimal {
        self.incentive_amount
            .unwrap_or_else(|| apply_percentage(self.total_sales, self.percentage))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChild {
    /// `None` quando a fatia é do próprio programa
    pub leader_id: Option<i64>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionPlan {
    pub parent_amount: Decimal,
    pub children: Vec<PlannedChild>,
}

/// Uma filha por fatia com valor > 0; o pai soma exatamente as filhas.
pub fn plan_distribution(shares: &[IncentiveShare]) -> DistributionPlan {
    let children: Vec<PlannedChild> = shares
        .iter()
        .map(|s| PlannedChild {
            leader_id: s.leader_id.leader_id(),
            amount: s.resolved_amount(),
        })
        .filter(|c| c.amount > Decimal::ZERO)
        .collect();

    DistributionPlan {
        parent_amount: children.iter().map(|c| c.amount).sum(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(target: DistributionTarget, sales: i64, pct: i64, amount: Option<i64>) -> IncentiveShare {
        IncentiveShare {
            leader_id: target,
            total_sales: Decimal::new(sales, 0),
            percentage: Decimal::new(pct, 0),
            incentive_amount: amount.map(|a| Decimal::new(a, 0)),
        }
    }

    #[test]
    fn parent_equals_sum_of_children() {
        let shares = vec![
            share(DistributionTarget::Leader(1), 4000, 5, Some(200)),
            share(DistributionTarget::Leader(2), 2000, 5, Some(100)),
            share(DistributionTarget::Leader(3), 0, 5, Some(0)),
            share(DistributionTarget::Leader(4), 100, 5, Some(-5)),
            share(DistributionTarget::Keyword(TargetKeyword::Program), 1000, 5, Some(50)),
        ];
        let plan = plan_distribution(&shares);

        assert_eq!(plan.children.len(), 3);
        assert_eq!(plan.parent_amount, Decimal::new(350, 0));
        assert_eq!(
            plan.parent_amount,
            plan.children.iter().map(|c| c.amount).sum::<Decimal>()
        );
        assert_eq!(plan.children[2].leader_id, None);
    }

    #[test]
    fn missing_amount_is_computed_from_sales() {
        let plan = plan_distribution(&[share(DistributionTarget::Leader(9), 4200, 5, None)]);
        assert_eq!(plan.children[0].amount, Decimal::new(210, 0));
    }

    #[test]
    fn target_accepts_leader_id_or_program_keyword() {
        let leader: DistributionTarget = serde_json::from_str("12").unwrap();
        assert_eq!(leader.leader_id(), Some(12));

        let program: DistributionTarget = serde_json::from_str("\"program\"").unwrap();
        assert_eq!(program.leader_id(), None);

        assert!(serde_json::from_str::<DistributionTarget>("\"leader\"").is_err());
    }

    #[test]
    fn share_serializes_in_the_request_shape() {
        let json = serde_json::to_value(share(
            DistributionTarget::Keyword(TargetKeyword::Program),
            500,
            4,
            None,
        ))
        .unwrap();
        assert_eq!(json["leaderId"], "program");
        assert!(json["incentiveAmount"].is_null());

        let json = serde_json::to_value(DistributionTarget::Leader(12)).unwrap();
        assert_eq!(json, 12);
    }

    #[test]
    fn nothing_positive_means_empty_plan() {
        let plan = plan_distribution(&[share(DistributionTarget::Leader(1), 0, 5, None)]);
        assert!(plan.children.is_empty());
        assert_eq!(plan.parent_amount, Decimal::ZERO);
    }
}
