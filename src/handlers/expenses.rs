// src/handlers/expenses.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::validate_not_negative,
    middleware::{auth::AuthenticatedActor, i18n::Locale, program::ProgramScope},
    models::{
        expense::{BudgetStatus, ExpenseDetail, ExpenseDistribution, ExpenseFilter, NewExpense},
        status::ApprovalStatus,
    },
    services::expense_service::DistributionRequest,
    settlement::distribution::IncentiveShare,
};

// =============================================================================
//  1. LANÇAMENTO (COM ORÇAMENTO)
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    /// Despesa de líder não consome o orçamento do programa
    #[schema(example = 12)]
    pub leader_id: Option<i64>,

    pub for_leader_id: Option<i64>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "150.00")]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "alimentacao")]
    pub category: String,

    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub expense_date: NaiveDate,

    pub notes: Option<String>,

    #[serde(default)]
    pub status: ApprovalStatus,
}

impl From<CreateExpensePayload> for NewExpense {
    fn from(p: CreateExpensePayload) -> Self {
        NewExpense {
            leader_id: p.leader_id,
            for_leader_id: p.for_leader_id,
            amount: p.amount,
            category: p.category,
            expense_date: p.expense_date,
            notes: p.notes,
            status: p.status,
        }
    }
}

// POST /api/expenses
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa criada", body = ExpenseDetail),
        (status = 422, description = "Orçamento da categoria excedido")
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn create_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let expense = app_state.expense_service
        .create(program.0, &actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// =============================================================================
//  2. RATEIO PROPORCIONAL
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "incentivos")]
    pub category: String,

    #[schema(value_type = String, format = Date, example = "2025-06-30")]
    pub expense_date: NaiveDate,

    pub notes: Option<String>,

    #[serde(default)]
    pub status: ApprovalStatus,

    #[validate(length(min = 1, message = "required"))]
    pub leaders: Vec<IncentiveShare>,
}

impl From<DistributionPayload> for DistributionRequest {
    fn from(p: DistributionPayload) -> Self {
        DistributionRequest {
            category: p.category,
            expense_date: p.expense_date,
            notes: p.notes,
            status: p.status,
            shares: p.leaders,
        }
    }
}

// POST /api/expenses/distributions
#[utoipa::path(
    post,
    path = "/api/expenses/distributions",
    tag = "Expenses",
    request_body = DistributionPayload,
    responses(
        (status = 201, description = "Despesa agregadora e uma filha por fatia", body = ExpenseDistribution),
        (status = 422, description = "Orçamento da categoria excedido")
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn create_distribution(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<DistributionPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let distribution = app_state.expense_service
        .distribute(program.0, &actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(distribution)))
}

// =============================================================================
//  3. APROVAÇÃO
// =============================================================================

// POST /api/expenses/{id}/approve
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/approve",
    tag = "Expenses",
    responses(
        (status = 200, description = "Despesa aprovada", body = ExpenseDetail),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID da Despesa"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, expense_id = id))]
pub async fn approve_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let expense = app_state.expense_service
        .approve(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(expense))
}

// POST /api/expenses/{id}/reject
#[utoipa::path(
    post,
    path = "/api/expenses/{id}/reject",
    tag = "Expenses",
    responses(
        (status = 200, description = "Despesa rejeitada", body = ExpenseDetail),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID da Despesa"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, expense_id = id))]
pub async fn reject_expense(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let expense = app_state.expense_service
        .reject(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(expense))
}

// =============================================================================
//  4. CONSULTA
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListExpensesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<ApprovalStatus>,
    pub category: Option<String>,
    pub leader_id: Option<i64>,
    pub parent_expense_id: Option<i64>,
}

impl From<ListExpensesQuery> for ExpenseFilter {
    fn from(q: ListExpensesQuery) -> Self {
        ExpenseFilter {
            from: q.from,
            to: q.to,
            status: q.status,
            category: q.category,
            leader_id: q.leader_id,
            parent_expense_id: q.parent_expense_id,
        }
    }
}

// GET /api/expenses
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    responses(
        (status = 200, description = "Despesas do programa", body = Vec<ExpenseDetail>)
    ),
    params(
        ListExpensesQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Query(query): Query<ListExpensesQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let expenses = app_state.expense_service
        .list(program.0, &query.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(expenses))
}

// GET /api/expenses/budgets
#[utoipa::path(
    get,
    path = "/api/expenses/budgets",
    tag = "Expenses",
    responses(
        (status = 200, description = "Orçamento, gasto aprovado e pendente por categoria", body = Vec<BudgetStatus>)
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
pub async fn budget_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
) -> Result<impl IntoResponse, ApiError> {

    let budgets = app_state.expense_service
        .budget_status(program.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(budgets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_status_defaults_to_pending() {
        let payload: CreateExpensePayload = serde_json::from_value(serde_json::json!({
            "amount": 80,
            "category": "alimentacao",
            "expenseDate": "2025-06-02"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.status, ApprovalStatus::Pending);
        assert!(payload.leader_id.is_none());
    }

    #[test]
    fn distribution_accepts_program_keyword_and_requires_shares() {
        let payload: DistributionPayload = serde_json::from_value(serde_json::json!({
            "category": "incentivos",
            "expenseDate": "2025-06-30",
            "leaders": [
                { "leaderId": 12, "totalSales": 1000, "percentage": 10 },
                { "leaderId": "program", "totalSales": 500, "percentage": 4, "incentiveAmount": 25 }
            ]
        }))
        .unwrap();
        assert!(payload.validate().is_ok());

        let request: DistributionRequest = payload.into();
        assert_eq!(request.shares[0].leader_id.leader_id(), Some(12));
        assert_eq!(request.shares[1].leader_id.leader_id(), None);
        assert_eq!(request.shares[1].resolved_amount(), Decimal::new(25, 0));

        let empty: DistributionPayload = serde_json::from_value(serde_json::json!({
            "category": "incentivos",
            "expenseDate": "2025-06-30",
            "leaders": []
        }))
        .unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn empty_distribution_reports_the_leaders_field() {
        let payload: DistributionPayload = serde_json::from_value(serde_json::json!({
            "category": "incentivos",
            "expenseDate": "2025-06-30",
            "leaders": []
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        let leaders = fields["leaders"];
        assert_eq!(leaders[0].code, "length");
        assert!(leaders[0].params.contains_key("value"));
    }
}
