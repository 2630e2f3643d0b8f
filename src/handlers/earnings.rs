// src/handlers/earnings.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::DateRangeQuery,
    middleware::{auth::AuthenticatedActor, i18n::Locale, program::ProgramScope},
    models::earnings::EarningsReport,
};

// GET /api/earnings/{person_id}
#[utoipa::path(
    get,
    path = "/api/earnings/{person_id}",
    tag = "Earnings",
    responses(
        (status = 200, description = "Bruto, comissão, descontos e valor final do período", body = EarningsReport),
        (status = 404, description = "Pessoa não encontrada no programa")
    ),
    params(
        ("person_id" = i64, Path, description = "ID do colportor ou líder"),
        DateRangeQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0, person_id = person_id))]
pub async fn get_earnings(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Path(person_id): Path<i64>,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let report = app_state.earnings_service
        .earnings(program.0, person_id, range.from, range.to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(report))
}
