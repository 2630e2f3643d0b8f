// src/db/charge_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::charge::{Charge, ChargeDetail, ChargeStatus, NewCharge},
};

const DETAIL_SELECT: &str = r#"
    SELECT c.id, c.program_id, c.person_id, c.amount, c.category, c.reason,
           c.charge_date, c.status, c.created_by, c.created_at, c.updated_at,
           (p.first_name || ' ' || p.last_name) AS person_name
    FROM charges c
    JOIN people p ON p.id = c.person_id
"#;

#[derive(Clone)]
pub struct ChargeRepository {
    pool: PgPool,
}

impl ChargeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        charge: &NewCharge,
        created_by: i64,
    ) -> Result<Charge, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Charge>(
            r#"
            INSERT INTO charges
                (program_id, person_id, amount, category, reason, charge_date, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(program_id)
        .bind(charge.person_id)
        .bind(charge.amount)
        .bind(&charge.category)
        .bind(&charge.reason)
        .bind(charge.charge_date)
        .bind(charge.status)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    pub async fn lock<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        id: i64,
    ) -> Result<Option<Charge>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let charge = sqlx::query_as::<_, Charge>(
            "SELECT * FROM charges WHERE id = $1 AND program_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(charge)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: ChargeStatus,
    ) -> Result<Charge, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let charge = sqlx::query_as::<_, Charge>(
            r#"
            UPDATE charges
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(charge)
    }

    /// Só cobranças APPLIED descontam dos ganhos.
    pub async fn applied_total<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        person_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM charges
            WHERE program_id = $1
              AND person_id = $2
              AND status = 'APPLIED'
              AND charge_date BETWEEN $3 AND $4
            "#,
        )
        .bind(program_id)
        .bind(person_id)
        .bind(from)
        .bind(to)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn find_detail(&self, program_id: i64, id: i64) -> Result<Option<ChargeDetail>, AppError> {
        let query = format!("{} WHERE c.id = $1 AND c.program_id = $2", DETAIL_SELECT);
        let detail = sqlx::query_as::<_, ChargeDetail>(&query)
            .bind(id)
            .bind(program_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(detail)
    }

    pub async fn list_details(
        &self,
        program_id: i64,
        person_id: Option<i64>,
        status: Option<ChargeStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ChargeDetail>, AppError> {
        let query = format!(
            r#"{}
            WHERE c.program_id = $1
              AND ($2::BIGINT IS NULL OR c.person_id = $2)
              AND ($3::charge_status IS NULL OR c.status = $3)
              AND ($4::DATE IS NULL OR c.charge_date >= $4)
              AND ($5::DATE IS NULL OR c.charge_date <= $5)
            ORDER BY c.charge_date DESC, c.id DESC
            "#,
            DETAIL_SELECT
        );

        let details = sqlx::query_as::<_, ChargeDetail>(&query)
            .bind(program_id)
            .bind(person_id)
            .bind(status)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }
}
