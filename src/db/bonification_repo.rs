// src/db/bonification_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{bonification::WorkHours, program::BonificationConfigRow},
};

#[derive(Clone)]
pub struct BonificationRepository {
    pool: PgPool,
}

impl BonificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn config(&self, program_id: i64) -> Result<Option<BonificationConfigRow>, AppError> {
        let row = sqlx::query_as::<_, BonificationConfigRow>(
            "SELECT selected_program_ids FROM bonification_configs WHERE program_id = $1",
        )
        .bind(program_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn save_config(
        &self,
        program_id: i64,
        selected_program_ids: &str,
    ) -> Result<BonificationConfigRow, AppError> {
        let row = sqlx::query_as::<_, BonificationConfigRow>(
            r#"
            INSERT INTO bonification_configs (program_id, selected_program_ids)
            VALUES ($1, $2)
            ON CONFLICT (program_id)
            DO UPDATE SET selected_program_ids = EXCLUDED.selected_program_ids, updated_at = NOW()
            RETURNING selected_program_ids
            "#,
        )
        .bind(program_id)
        .bind(selected_program_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Horas somadas de todos os cadastros da pessoa nos programas vinculados.
    pub async fn total_hours(
        &self,
        person_ids: &[i64],
        program_ids: &[i64],
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(hours), 0)
            FROM work_hours
            WHERE person_id = ANY($1) AND program_id = ANY($2)
            "#,
        )
        .bind(person_ids)
        .bind(program_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Vendas aprovadas como colportor nos programas vinculados.
    pub async fn total_approved_sales(
        &self,
        person_ids: &[i64],
        program_ids: &[i64],
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total), 0)
            FROM transactions
            WHERE student_id = ANY($1)
              AND program_id = ANY($2)
              AND status = 'APPROVED'
            "#,
        )
        .bind(person_ids)
        .bind(program_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Uma linha por pessoa, programa e dia; gravar de novo substitui as horas.
    pub async fn record_hours(
        &self,
        program_id: i64,
        person_id: i64,
        work_date: NaiveDate,
        hours: Decimal,
    ) -> Result<WorkHours, AppError> {
        let row = sqlx::query_as::<_, WorkHours>(
            r#"
            INSERT INTO work_hours (program_id, person_id, work_date, hours)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (person_id, program_id, work_date)
            DO UPDATE SET hours = EXCLUDED.hours
            RETURNING id, program_id, person_id, work_date, hours
            "#,
        )
        .bind(program_id)
        .bind(person_id)
        .bind(work_date)
        .bind(hours)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
