// src/handlers/transactions.rs

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
        status::ApprovalStatus,
        transaction::{
            BookLineInput, NewTransaction, PaymentAmounts, PaymentAmountsPatch,
            TransactionChanges, TransactionDetail, TransactionFilter, TransitionOutcome,
        },
    },
};

// =============================================================================
//  1. LANÇAMENTO E EDIÇÃO
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    #[schema(example = 31)]
    pub student_id: i64,

    #[schema(example = 12)]
    pub leader_id: i64,

    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub transaction_date: NaiveDate,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "120.00")]
    pub cash: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "0.00")]
    pub checks: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "45.50")]
    pub atm_mobile: Decimal,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "0.00")]
    pub paypal: Decimal,

    #[serde(default)]
    pub books: Vec<BookLineInput>,
}

impl From<CreateTransactionPayload> for NewTransaction {
    fn from(p: CreateTransactionPayload) -> Self {
        NewTransaction {
            student_id: p.student_id,
            leader_id: p.leader_id,
            transaction_date: p.transaction_date,
            amounts: PaymentAmounts {
                cash: p.cash,
                checks: p.checks,
                atm_mobile: p.atm_mobile,
                paypal: p.paypal,
            },
            books: p.books,
        }
    }
}

// POST /api/transactions
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Transactions",
    request_body = CreateTransactionPayload,
    responses(
        (status = 201, description = "Transação lançada como PENDING", body = TransactionDetail),
        (status = 409, description = "Já existe transação ativa do colportor no dia")
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let transaction = app_state.transaction_service
        .create(program.0, &actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionPayload {
    pub student_id: Option<i64>,
    pub leader_id: Option<i64>,

    #[schema(value_type = Option<String>, format = Date)]
    pub transaction_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_not_negative"))]
    pub cash: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub checks: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub atm_mobile: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub paypal: Option<Decimal>,

    /// Quando presente, substitui todas as linhas de livros
    pub books: Option<Vec<BookLineInput>>,
}

impl From<UpdateTransactionPayload> for TransactionChanges {
    fn from(p: UpdateTransactionPayload) -> Self {
        TransactionChanges {
            student_id: p.student_id,
            leader_id: p.leader_id,
            transaction_date: p.transaction_date,
            amounts: PaymentAmountsPatch {
                cash: p.cash,
                checks: p.checks,
                atm_mobile: p.atm_mobile,
                paypal: p.paypal,
            },
            books: p.books,
        }
    }
}

// PUT /api/transactions/{id}
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    request_body = UpdateTransactionPayload,
    responses(
        (status = 200, description = "Transação atualizada", body = TransactionDetail),
        (status = 409, description = "Transação não está PENDING")
    ),
    params(
        ("id" = i64, Path, description = "ID da Transação"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, transaction_id = id))]
pub async fn update_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTransactionPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let transaction = app_state.transaction_service
        .update(program.0, id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(transaction))
}

// =============================================================================
//  2. CONSULTA
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<ApprovalStatus>,
    pub student_id: Option<i64>,
    pub leader_id: Option<i64>,
}

impl From<ListTransactionsQuery> for TransactionFilter {
    fn from(q: ListTransactionsQuery) -> Self {
        TransactionFilter {
            from: q.from,
            to: q.to,
            status: q.status,
            student_id: q.student_id,
            leader_id: q.leader_id,
        }
    }
}

// GET /api/transactions
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    responses(
        (status = 200, description = "Transações do programa", body = Vec<TransactionDetail>)
    ),
    params(
        ListTransactionsQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let transactions = app_state.transaction_service
        .list(program.0, &query.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(transactions))
}

// GET /api/transactions/{id}
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    responses(
        (status = 200, description = "Transação com linhas de livros", body = TransactionDetail),
        (status = 404, description = "Transação não encontrada")
    ),
    params(
        ("id" = i64, Path, description = "ID da Transação"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let transaction = app_state.transaction_service
        .get(program.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(transaction))
}

// =============================================================================
//  3. APROVAÇÃO
// =============================================================================

// POST /api/transactions/{id}/approve
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/approve",
    tag = "Transactions",
    responses(
        (status = 200, description = "Transação aprovada; estoque incrementado", body = TransitionOutcome),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID da Transação"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, transaction_id = id))]
pub async fn approve_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let outcome = app_state.transaction_service
        .approve(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(outcome))
}

// POST /api/transactions/{id}/reject
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/reject",
    tag = "Transactions",
    responses(
        (status = 200, description = "Transação rejeitada; estoque revertido se estava aprovada", body = TransitionOutcome),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID da Transação"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, transaction_id = id))]
pub async fn reject_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let outcome = app_state.transaction_service
        .reject(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_amounts_default_to_zero() {
        let payload: CreateTransactionPayload = serde_json::from_value(serde_json::json!({
            "studentId": 31,
            "leaderId": 12,
            "transactionDate": "2025-06-02",
            "cash": 120.5
        }))
        .unwrap();
        assert!(payload.validate().is_ok());

        let input: NewTransaction = payload.into();
        assert_eq!(input.amounts.total(), Decimal::new(1205, 1));
        assert!(input.books.is_empty());
    }

    #[test]
    fn negative_amount_fails_validation() {
        let payload: CreateTransactionPayload = serde_json::from_value(serde_json::json!({
            "studentId": 31,
            "leaderId": 12,
            "transactionDate": "2025-06-02",
            "paypal": -1
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("paypal"));
    }

    #[test]
    fn partial_update_only_touches_given_fields() {
        let payload: UpdateTransactionPayload = serde_json::from_value(serde_json::json!({
            "checks": 10
        }))
        .unwrap();
        assert!(payload.validate().is_ok());

        let changes: TransactionChanges = payload.into();
        assert_eq!(changes.amounts.checks, Some(Decimal::new(10, 0)));
        assert!(changes.amounts.cash.is_none());
        assert!(changes.books.is_none());
        assert!(changes.student_id.is_none());
    }
}
