// src/models/earnings.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::person::PersonType;

// --- Linhas lidas do banco (entrada da calculadora) ---

#[derive(Debug, Clone, FromRow)]
pub struct SaleRow {
    pub transaction_date: NaiveDate,
    pub total: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct BookQuantityRow {
    pub catalog_price: Decimal,
    pub quantity: i64,
}

// --- Saída ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub date: NaiveDate,
    pub total: Decimal,
    pub transactions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookBreakdown {
    pub large_books: i64,
    pub small_books: i64,
    pub total_books: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionSummary {
    #[schema(example = "150.00")]
    pub gross: Decimal,
    #[schema(example = "50.00")]
    pub percentage: Decimal,
    #[schema(example = "75.00")]
    pub net: Decimal,
    pub books: BookBreakdown,
    pub days: Vec<DayBucket>,
    pub best_day: Option<DayBucket>,
    /// Nunca é um dia sem vendas
    pub worst_day: Option<DayBucket>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deductions {
    pub charges: Decimal,
    pub advances: Decimal,
    /// Sempre zero para colportores
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarningsReport {
    pub person_id: i64,
    pub person_name: String,
    pub person_type: PersonType,
    pub program_id: i64,
    #[schema(value_type = String, format = Date)]
    pub from: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub to: NaiveDate,
    pub commission: CommissionSummary,
    pub deductions: Deductions,
    /// Pode ser negativo; não é truncado
    pub final_amount: Decimal,
}
