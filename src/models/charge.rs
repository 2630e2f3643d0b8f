// src/models/charge.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "charge_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    Pending,
    Applied,   // Só estas descontam dos ganhos
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    pub id: i64,
    pub program_id: i64,
    pub person_id: i64,
    #[schema(example = "15.00")]
    pub amount: Decimal,
    #[schema(example = "multa")]
    pub category: String,
    pub reason: Option<String>,
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub charge_date: NaiveDate,
    pub status: ChargeStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub charge: Charge,
    pub person_name: String,
}

#[derive(Debug, Clone)]
pub struct NewCharge {
    pub person_id: i64,
    pub amount: Decimal,
    pub category: String,
    pub reason: Option<String>,
    pub charge_date: NaiveDate,
    pub status: ChargeStatus,
}
