// src/services/bonification_service.rs

use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{BonificationRepository, PersonRepository, ProgramRepository},
    models::{
        bonification::{BonificationConfig, BonificationStatus, WorkHours},
        person::{Person, PersonStatus, PersonType},
        program::SelectedProgramIds,
    },
    settlement::{apply_percentage, bonification::evaluate, commission::CommissionDefaults},
};

const MAX_HOURS_PER_DAY: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

// Cadastros ACTIVE com o mesmo email. O próprio cadastro só entra se estiver ACTIVE.
fn matched_person_ids(colporter: &Person, mut email_matches: Vec<i64>) -> Vec<i64> {
    if colporter.status == PersonStatus::Active && !email_matches.contains(&colporter.id) {
        email_matches.push(colporter.id);
    }
    email_matches.sort_unstable();
    email_matches
}

#[derive(Clone)]
pub struct BonificationService {
    pool: PgPool,
    bonification_repo: BonificationRepository,
    person_repo: PersonRepository,
    program_repo: ProgramRepository,
    defaults: CommissionDefaults,
}

impl BonificationService {
    pub fn new(
        pool: PgPool,
        bonification_repo: BonificationRepository,
        person_repo: PersonRepository,
        program_repo: ProgramRepository,
        defaults: CommissionDefaults,
    ) -> Self {
        Self { pool, bonification_repo, person_repo, program_repo, defaults }
    }

    /// Programas vinculados ao programa; sem configuração, só ele mesmo.
    pub async fn selected_programs(&self, program_id: i64) -> Result<SelectedProgramIds, AppError> {
        match self.bonification_repo.config(program_id).await? {
            Some(row) => {
                // texto gravado fora do formato é defeito de dado, não do cliente
                let ids = SelectedProgramIds::parse(&row.selected_program_ids)
                    .with_context(|| format!("bonification_configs inválido no programa {}", program_id))?;
                Ok(ids)
            }
            None => Ok(SelectedProgramIds::only(program_id)),
        }
    }

    // Percentual do colportor do primeiro programa vinculado
    async fn colporter_percentage(&self, programs: &SelectedProgramIds) -> Result<Decimal, AppError> {
        let config = self
            .program_repo
            .financial_config(&self.pool, programs.first())
            .await?;
        Ok(config
            .map(|c| c.colporter_percentage)
            .unwrap_or(self.defaults.colporter))
    }

    async fn evaluate_colporter(
        &self,
        colporter: &Person,
        programs: &SelectedProgramIds,
        percentage: Decimal,
    ) -> Result<BonificationStatus, AppError> {
        let email_matches = self
            .person_repo
            .matching_colporter_ids(&colporter.email, programs.as_slice())
            .await?;
        let matched = matched_person_ids(colporter, email_matches);

        let hours = self
            .bonification_repo
            .total_hours(&matched, programs.as_slice())
            .await?;
        let total_sales = self
            .bonification_repo
            .total_approved_sales(&matched, programs.as_slice())
            .await?;
        let net = apply_percentage(total_sales, percentage);

        Ok(BonificationStatus {
            colporter_id: colporter.id,
            colporter_name: colporter.full_name(),
            email: colporter.email.clone(),
            matched_person_ids: matched,
            program_ids: programs.clone(),
            total_sales,
            colporter_percentage: percentage,
            progress: evaluate(hours, net),
        })
    }

    pub async fn status(
        &self,
        program_id: i64,
        colporter_id: i64,
    ) -> Result<BonificationStatus, AppError> {
        let colporter = self
            .person_repo
            .find_typed(&self.pool, program_id, colporter_id, PersonType::Colporter)
            .await?
            .ok_or(AppError::ResourceNotFound("colporter"))?;

        let programs = self.selected_programs(program_id).await?;
        let percentage = self.colporter_percentage(&programs).await?;

        self.evaluate_colporter(&colporter, &programs, percentage).await
    }

    /// Todos os colportores ativos do programa, com o mesmo conjunto de programas e percentual.
    pub async fn status_batch(&self, program_id: i64) -> Result<Vec<BonificationStatus>, AppError> {
        let programs = self.selected_programs(program_id).await?;
        let percentage = self.colporter_percentage(&programs).await?;
        let colporters = self.person_repo.list_active_colporters(program_id).await?;

        let mut statuses = Vec::with_capacity(colporters.len());
        for colporter in &colporters {
            statuses.push(self.evaluate_colporter(colporter, &programs, percentage).await?);
        }
        Ok(statuses)
    }

    pub async fn config(&self, program_id: i64) -> Result<BonificationConfig, AppError> {
        Ok(BonificationConfig {
            program_id,
            selected_program_ids: self.selected_programs(program_id).await?,
        })
    }

    pub async fn save_config(
        &self,
        program_id: i64,
        program_ids: Vec<i64>,
    ) -> Result<BonificationConfig, AppError> {
        let selected = SelectedProgramIds::new(program_ids)?;

        let missing = self.program_repo.missing_program_ids(selected.as_slice()).await?;
        if !missing.is_empty() {
            return Err(AppError::InvalidInput(format!("programas inexistentes: {:?}", missing)));
        }

        let row = self
            .bonification_repo
            .save_config(program_id, &selected.to_json())
            .await?;

        tracing::info!(program_id, programs = %row.selected_program_ids, "Configuração de bonificação salva");

        Ok(BonificationConfig { program_id, selected_program_ids: selected })
    }

    pub async fn record_hours(
        &self,
        program_id: i64,
        person_id: i64,
        work_date: NaiveDate,
        hours: Decimal,
    ) -> Result<WorkHours, AppError> {
        if hours <= Decimal::ZERO || hours > MAX_HOURS_PER_DAY {
            return Err(AppError::InvalidInput(format!(
                "horas devem estar entre 0 e {} (recebido {})",
                MAX_HOURS_PER_DAY, hours
            )));
        }

        self.person_repo
            .find_in_program(&self.pool, program_id, person_id)
            .await?
            .ok_or(AppError::ResourceNotFound("person"))?;

        self.bonification_repo
            .record_hours(program_id, person_id, work_date, hours)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colporter(id: i64, status: PersonStatus) -> Person {
        Person {
            id,
            program_id: 1,
            first_name: "Ana".into(),
            last_name: "Souza".into(),
            email: "ana@exemplo.com".into(),
            person_type: PersonType::Colporter,
            status,
        }
    }

    #[test]
    fn active_colporter_counts_its_own_row() {
        let matched = matched_person_ids(&colporter(5, PersonStatus::Active), vec![9]);
        assert_eq!(matched, vec![5, 9]);

        let matched = matched_person_ids(&colporter(5, PersonStatus::Active), vec![5, 9]);
        assert_eq!(matched, vec![5, 9]);
    }

    #[test]
    fn inactive_row_is_left_out() {
        let matched = matched_person_ids(&colporter(5, PersonStatus::Inactive), vec![9, 3]);
        assert_eq!(matched, vec![3, 9]);

        let matched = matched_person_ids(&colporter(5, PersonStatus::Inactive), vec![]);
        assert!(matched.is_empty());
    }
}
