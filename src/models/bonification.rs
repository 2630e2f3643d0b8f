// src/models/bonification.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::program::SelectedProgramIds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Silver,
    Gold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextTarget {
    Silver,
    Gold,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub tier: Tier,
    pub required_hours: Decimal,
    pub required_amount: Decimal,
    /// 0..=100
    pub hours_progress: Decimal,
    /// 0..=100
    pub amount_progress: Decimal,
    pub remaining_hours: Decimal,
    pub remaining_amount: Decimal,
    pub achieved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonificationProgress {
    pub hours_worked: Decimal,
    pub net_amount: Decimal,
    pub silver: TierProgress,
    pub gold: TierProgress,
    pub next_target: NextTarget,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonificationStatus {
    pub colporter_id: i64,
    pub colporter_name: String,
    pub email: String,
    /// Todos os cadastros do mesmo colportor nos programas vinculados
    pub matched_person_ids: Vec<i64>,
    pub program_ids: SelectedProgramIds,
    pub total_sales: Decimal,
    pub colporter_percentage: Decimal,
    #[serde(flatten)]
    pub progress: BonificationProgress,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkHours {
    pub id: i64,
    pub program_id: i64,
    pub person_id: i64,
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub work_date: NaiveDate,
    #[schema(example = "8.50")]
    pub hours: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BonificationConfig {
    pub program_id: i64,
    pub selected_program_ids: SelectedProgramIds,
}
