// src/handlers/advances.rs

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
    handlers::validate_positive,
    middleware::{auth::AuthenticatedActor, i18n::Locale, program::ProgramScope},
    models::{
        advance::{CashAdvanceDetail, NewCashAdvance},
        status::ApprovalStatus,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestAdvancePayload {
    #[schema(example = 31)]
    pub person_id: i64,

    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub week_start_date: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2025-06-08")]
    pub week_end_date: NaiveDate,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "100.00")]
    pub advance_amount: Decimal,
}

impl From<RequestAdvancePayload> for NewCashAdvance {
    fn from(p: RequestAdvancePayload) -> Self {
        NewCashAdvance {
            person_id: p.person_id,
            week_start_date: p.week_start_date,
            week_end_date: p.week_end_date,
            advance_amount: p.advance_amount,
        }
    }
}

// POST /api/cash-advances
#[utoipa::path(
    post,
    path = "/api/cash-advances",
    tag = "Cash Advances",
    request_body = RequestAdvancePayload,
    responses(
        (status = 201, description = "Adiantamento solicitado com snapshot das vendas da semana", body = CashAdvanceDetail),
        (status = 409, description = "Já existe adiantamento ativo na semana"),
        (status = 422, description = "Valor acima do limite da semana")
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn request_advance(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<RequestAdvancePayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let advance = app_state.advance_service
        .request(program.0, &actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(advance)))
}

// POST /api/cash-advances/{id}/approve
#[utoipa::path(
    post,
    path = "/api/cash-advances/{id}/approve",
    tag = "Cash Advances",
    responses(
        (status = 200, description = "Adiantamento aprovado", body = CashAdvanceDetail),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID do Adiantamento"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, advance_id = id))]
pub async fn approve_advance(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let advance = app_state.advance_service
        .approve(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(advance))
}

// POST /api/cash-advances/{id}/reject
#[utoipa::path(
    post,
    path = "/api/cash-advances/{id}/reject",
    tag = "Cash Advances",
    responses(
        (status = 200, description = "Adiantamento rejeitado", body = CashAdvanceDetail),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID do Adiantamento"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, advance_id = id))]
pub async fn reject_advance(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let advance = app_state.advance_service
        .reject(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(advance))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListAdvancesQuery {
    pub person_id: Option<i64>,
    pub status: Option<ApprovalStatus>,
    /// Filtra pelo início da semana
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/cash-advances
#[utoipa::path(
    get,
    path = "/api/cash-advances",
    tag = "Cash Advances",
    responses(
        (status = 200, description = "Adiantamentos do programa", body = Vec<CashAdvanceDetail>)
    ),
    params(
        ListAdvancesQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_advances(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Query(query): Query<ListAdvancesQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let advances = app_state.advance_service
        .list(program.0, query.person_id, query.status, query.from, query.to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(advances))
}
