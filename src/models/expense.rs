// src/models/expense.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::status::ApprovalStatus;

/// Categoria cujo rateio proporcional entre líderes é permitido.
pub const INCENTIVES_CATEGORY: &str = "incentivos";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub program_id: i64,
    /// `None` = despesa do programa (sujeita ao orçamento)
    pub leader_id: Option<i64>,
    pub for_leader_id: Option<i64>,
    #[schema(example = "350.00")]
    pub amount: Decimal,
    #[schema(example = "alimentacion")]
    pub category: String,
    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
    pub status: ApprovalStatus,
    pub parent_expense_id: Option<i64>,
    pub is_parent_expense: bool,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub expense: Expense,
    pub leader_name: Option<String>,
    pub for_leader_name: Option<String>,
}

// Retorno do rateio: a linha agregadora e as filhas criadas
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDistribution {
    pub parent: ExpenseDetail,
    pub children: Vec<ExpenseDetail>,
}

/// Corpo estruturado do erro de orçamento excedido.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInfo {
    pub category: String,
    pub budget: Decimal,
    pub current_spending: Decimal,
    pub remaining: Decimal,
    pub requested_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub category: String,
    pub budget: Decimal,
    pub approved_spending: Decimal,
    pub pending_spending: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub leader_id: Option<i64>,
    pub for_leader_id: Option<i64>,
    pub amount: Decimal,
    pub category: String,
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<ApprovalStatus>,
    pub category: Option<String>,
    pub leader_id: Option<i64>,
    pub parent_expense_id: Option<i64>,
}
