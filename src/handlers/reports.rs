// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::DateRangeQuery,
    middleware::{auth::AuthenticatedActor, i18n::Locale, program::ProgramScope},
    models::{
        person::PersonType,
        report::{PeopleReport, ProgramReport},
    },
};

// GET /api/reports/program
#[utoipa::path(
    get,
    path = "/api/reports/program",
    tag = "Reports",
    responses(
        (status = 200, description = "Totais do programa por mês, semana e dia", body = ProgramReport)
    ),
    params(
        DateRangeQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn program_report(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Query(range): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let report = app_state.report_service
        .program_report(program.0, range.from, range.to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(report))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PeopleReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// COLPORTER (padrão) ou LEADER
    pub person_type: Option<PersonType>,
}

// GET /api/reports/people
#[utoipa::path(
    get,
    path = "/api/reports/people",
    tag = "Reports",
    responses(
        (status = 200, description = "Totais por colportor ou por líder", body = PeopleReport)
    ),
    params(
        PeopleReportQuery,
        ("x-program-id" = Option<i64>, Header, description = "ID do Programa")
    ),
    security(("api_jwt" = []))
)]
#[tracing::instrument(skip_all, fields(program_id = program.0))]
pub async fn people_report(
    State(app_state): State<AppState>,
    locale: Locale,
    _actor: AuthenticatedActor,
    program: ProgramScope,
    Query(query): Query<PeopleReportQuery>,
) -> Result<impl IntoResponse, ApiError> {

    let person_type = query.person_type.unwrap_or(PersonType::Colporter);

    let report = app_state.report_service
        .people_report(program.0, person_type, query.from, query.to)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(report))
}
