// src/handlers/charges.rs

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
    models::charge::{ChargeDetail, ChargeStatus, NewCharge},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargePayload {
    #[schema(example = 31)]
    pub person_id: i64,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "35.00")]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "multa")]
    pub category: String,

    pub reason: Option<String>,

    #[schema(value_type = String, format = Date, example = "2025-06-03")]
    pub charge_date: NaiveDate,

    /// PENDING (padrão) ou APPLIED
    pub status: Option<ChargeStatus>,
}

impl From<CreateChargePayload> for NewCharge {
    fn from(p: CreateChargePayload) -> Self {
        NewCharge {
            person_id: p.person_id,
            amount: p.amount,
            category: p.category,
            reason: p.reason,
            charge_date: p.charge_date,
            status: p.status.unwrap_or(ChargeStatus::Pending),
        }
    }
}

// POST /api/charges
#[utoipa::path(
    post,
    path = "/api/charges",
    tag = "Charges",
    request_body = CreateChargePayload,
    responses(
        (status = 201, description = "Cobrança registrada", body = ChargeDetail)
    ),
    params(
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn create_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Json(payload): Json<CreateChargePayload>,
) -> Result<impl IntoResponse, ApiError> {

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let charge = app_state.charge_service
        .create(program.0, &actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(charge)))
}

// POST /api/charges/{id}/apply
#[utoipa::path(
    post,
    path = "/api/charges/{id}/apply",
    tag = "Charges",
    responses(
        (status = 200, description = "Cobrança aplicada; passa a descontar nos ganhos", body = ChargeDetail),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID da Cobrança"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, charge_id = id))]
pub async fn apply_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let charge = app_state.charge_service
        .apply(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(charge))
}

// POST /api/charges/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/charges/{id}/cancel",
    tag = "Charges",
    responses(
        (status = 200, description = "Cobrança cancelada", body = ChargeDetail),
        (status = 409, description = "Transição inválida")
    ),
    params(
        ("id" = i64, Path, description = "ID da Cobrança"),
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, charge_id = id))]
pub async fn cancel_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedActor(actor): AuthenticatedActor,
    program: ProgramScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {

    let charge = app_state.charge_service
        .cancel(program.0, id, &actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(charge))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListChargesQuery {
    pub person_id: Option<i64>,
    pub status: Option<ChargeStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/charges
#[utoipa::path(
    get,
    path = "/api/charges",
    tag = "Charges",
    responses(
        (status = 200, description = "Cobranças do programa", body = Vec<ChargeDetail>)
    ),
    params(
        ListChargesQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_charges(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Query(query): Query<ListChargesQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let charges = app_state.charge_service
        .list(program.0, query.person_id, query.status, query.from, query.to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(charges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_defaults_to_pending_and_rejects_zero_amount() {
        let payload: CreateChargePayload = serde_json::from_value(serde_json::json!({
            "personId": 31,
            "amount": 35,
            "category": "multa",
            "chargeDate": "2025-06-03"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        let charge: NewCharge = payload.into();
        assert_eq!(charge.status, ChargeStatus::Pending);

        let zero: CreateChargePayload = serde_json::from_value(serde_json::json!({
            "personId": 31,
            "amount": 0,
            "category": "multa",
            "chargeDate": "2025-06-03"
        }))
        .unwrap();
        assert!(zero.validate().unwrap_err().field_errors().contains_key("amount"));
    }
}
