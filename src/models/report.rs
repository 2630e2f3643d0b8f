// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::person::PersonType;

// --- Linhas lidas do banco ---

#[derive(Debug, Clone, FromRow)]
pub struct ReportTransactionRow {
    pub id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub leader_id: i64,
    pub leader_name: String,
    pub transaction_date: NaiveDate,
    pub cash: Decimal,
    pub checks: Decimal,
    pub atm_mobile: Decimal,
    pub paypal: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReportBookLine {
    pub transaction_id: i64,
    pub book_id: i64,
    pub title: String,
    pub catalog_price: Decimal,
    pub quantity: i64,
}

// --- Agregados ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopSeller {
    pub book_id: i64,
    pub title: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub cash: Decimal,
    pub checks: Decimal,
    pub atm_mobile: Decimal,
    pub paypal: Decimal,
    pub total: Decimal,
    pub large_books: i64,
    pub small_books: i64,
    pub transactions: i64,
    pub top_seller: Option<TopSeller>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayRollup {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub totals: SalesTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeekRollup {
    /// Segunda-feira da semana
    #[schema(value_type = String, format = Date)]
    pub week_start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub week_end: NaiveDate,
    pub totals: SalesTotals,
    pub days: Vec<DayRollup>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthRollup {
    #[schema(example = "2025-06")]
    pub month: String,
    pub totals: SalesTotals,
    pub weeks: Vec<WeekRollup>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramReport {
    pub program_id: i64,
    #[schema(value_type = String, format = Date)]
    pub from: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub to: NaiveDate,
    pub totals: SalesTotals,
    pub months: Vec<MonthRollup>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonRollup {
    pub person_id: i64,
    pub person_name: String,
    pub totals: SalesTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeopleReport {
    pub program_id: i64,
    pub person_type: PersonType,
    #[schema(value_type = String, format = Date)]
    pub from: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub to: NaiveDate,
    pub people: Vec<PersonRollup>,
}
