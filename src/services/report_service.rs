// src/services/report_service.rs

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::{
        person::PersonType,
        report::{PeopleReport, ProgramReport},
    },
    services::earnings_service::check_range,
    settlement::report::{build_people_report, build_program_report},
};

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository) -> Self {
        Self { report_repo }
    }

    pub async fn program_report(
        &self,
        program_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ProgramReport, AppError> {
        check_range(from, to)?;

        let rows = self.report_repo.approved_transactions(program_id, from, to).await?;
        let lines = self.report_repo.approved_book_lines(program_id, from, to).await?;

        Ok(build_program_report(program_id, from, to, &rows, &lines))
    }

    pub async fn people_report(
        &self,
        program_id: i64,
        person_type: PersonType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PeopleReport, AppError> {
        check_range(from, to)?;

        let rows = self.report_repo.approved_transactions(program_id, from, to).await?;
        let lines = self.report_repo.approved_book_lines(program_id, from, to).await?;

        Ok(build_people_report(program_id, person_type, from, to, &rows, &lines))
    }
}
