// src/models/advance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::status::ApprovalStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashAdvance {
    pub id: i64,
    pub program_id: i64,
    pub person_id: i64,
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub week_start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2025-06-08")]
    pub week_end_date: NaiveDate,
    /// Vendas aprovadas da semana no momento do pedido
    #[schema(example = "900.00")]
    pub total_sales: Decimal,
    #[schema(example = "150.00")]
    pub advance_amount: Decimal,
    pub status: ApprovalStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashAdvanceDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub advance: CashAdvance,
    pub person_name: String,
}

#[derive(Debug, Clone)]
pub struct NewCashAdvance {
    pub person_id: i64,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub advance_amount: Decimal,
}
