// src/handlers/bonifications.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::validate_positive,
    middleware::{auth::AuthenticatedActor, i18n::Locale, program::ProgramScope},
    models::bonification::{BonificationConfig, BonificationStatus, WorkHours},
};

// =============================================================================
//  1. AVALIAÇÃO DE BONIFICAÇÃO
// =============================================================================

// GET /api/bonifications/{colporter_id}
#[utoipa::path(
    get,
    path = "/api/bonifications/{colporter_id}",
    tag = "Bonifications",
    responses(
        (status = 200, description = "Progresso do colportor nos níveis SILVER e GOLD", body = BonificationStatus),
        (status = 404, description = "Colportor não encontrado")
    ),
    params(
        ("colporter_id" = i64, Path, description = "ID do Colportor"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, colporter_id = colporter_id))]
pub async fn get_bonification(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Path(colporter_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let status = app_state.bonification_service
        .status(program.0, colporter_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(status))
}

// GET /api/bonifications
#[utoipa::path(
    get,
    path = "/api/bonifications",
    tag = "Bonifications",
    responses(
        (status = 200, description = "Progresso de todos os colportores ativos do programa", body = Vec<BonificationStatus>)
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn list_bonifications(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
) -> Result<impl IntoResponse, ApiError> {

    let statuses = app_state.bonification_service
        .status_batch(program.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(statuses))
}

// =============================================================================
//  2. PROGRAMAS VINCULADOS
// =============================================================================

// GET /api/bonifications/config
#[utoipa::path(
    get,
    path = "/api/bonifications/config",
    tag = "Bonifications",
    responses(
        (status = 200, description = "Programas somados na avaliação", body = BonificationConfig)
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_config(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
) -> Result<impl IntoResponse, ApiError> {

    let config = app_state.bonification_service
        .config(program.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(config))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = json!([1, 4]))]
    pub selected_program_ids: Vec<i64>,
}

// PUT /api/bonifications/config
#[utoipa::path(
    put,
    path = "/api/bonifications/config",
    tag = "Bonifications",
    request_body = SaveConfigPayload,
    responses(
        (status = 200, description = "Configuração salva", body = BonificationConfig),
        (status = 400, description = "Lista vazia, id inválido ou programa inexistente")
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn save_config(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<SaveConfigPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let config = app_state.bonification_service
        .save_config(program.0, payload.selected_program_ids)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(config))
}

// =============================================================================
//  3. HORAS TRABALHADAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordHoursPayload {
    #[schema(example = 31)]
    pub person_id: i64,

    #[schema(value_type = String, format = Date, example = "2025-06-02")]
    pub work_date: NaiveDate,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "8.50")]
    pub hours: Decimal,
}

// POST /api/hours
#[utoipa::path(
    post,
    path = "/api/hours",
    tag = "Bonifications",
    request_body = RecordHoursPayload,
    responses(
        (status = 200, description = "Horas do dia registradas (substitui o valor anterior)", body = WorkHours)
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn record_hours(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<RecordHoursPayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let hours = app_state.bonification_service
        .record_hours(program.0, payload.person_id, payload.work_date, payload.hours)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(hours))
}
