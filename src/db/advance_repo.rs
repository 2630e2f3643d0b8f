// src/db/advance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    models::{
        advance::{CashAdvance, CashAdvanceDetail, NewCashAdvance},
        status::ApprovalStatus,
    },
};

pub(crate) const DUPLICATE_ADVANCE: &str =
    "já existe um adiantamento pendente ou aprovado para esta pessoa nesta semana";

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.program_id, a.person_id, a.week_start_date, a.week_end_date,
           a.total_sales, a.advance_amount, a.status, a.created_by, a.created_at, a.updated_at,
           (p.first_name || ' ' || p.last_name) AS person_name
    FROM cash_advances a
    JOIN people p ON p.id = a.person_id
"#;

#[derive(Clone)]
pub struct CashAdvanceRepository {
    pool: PgPool,
}

impl CashAdvanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn active_exists_for_week<'e, E>(
        &self,
        executor: E,
        person_id: i64,
        week_start_date: NaiveDate,
        week_end_date: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM cash_advances
                WHERE person_id = $1
                  AND week_start_date = $2
                  AND week_end_date = $3
                  AND status IN ('PENDING', 'APPROVED')
            )
            "#,
        )
        .bind(person_id)
        .bind(week_start_date)
        .bind(week_end_date)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        advance: &NewCashAdvance,
        total_sales: Decimal,
        created_by: i64,
    ) -> Result<CashAdvance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CashAdvance>(
            r#"
            INSERT INTO cash_advances
                (program_id, person_id, week_start_date, week_end_date,
                 total_sales, advance_amount, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', $7)
            RETURNING *
            "#,
        )
        .bind(program_id)
        .bind(advance.person_id)
        .bind(advance.week_start_date)
        .bind(advance.week_end_date)
        .bind(total_sales)
        .bind(advance.advance_amount)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_ADVANCE))
    }

    pub async fn lock<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        id: i64,
    ) -> Result<Option<CashAdvance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let advance = sqlx::query_as::<_, CashAdvance>(
            "SELECT * FROM cash_advances WHERE id = $1 AND program_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(advance)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: ApprovalStatus,
    ) -> Result<CashAdvance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CashAdvance>(
            r#"
            UPDATE cash_advances
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_ADVANCE))
    }

    /// Adiantamentos aprovados cuja semana começa dentro do período.
    pub async fn approved_total<'e, E>(
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
            SELECT COALESCE(SUM(advance_amount), 0)
            FROM cash_advances
            WHERE program_id = $1
              AND person_id = $2
              AND status = 'APPROVED'
              AND week_start_date BETWEEN $3 AND $4
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

    pub async fn find_detail(
        &self,
        program_id: i64,
        id: i64,
    ) -> Result<Option<CashAdvanceDetail>, AppError> {
        let query = format!("{} WHERE a.id = $1 AND a.program_id = $2", DETAIL_SELECT);
        let detail = sqlx::query_as::<_, CashAdvanceDetail>(&query)
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
        status: Option<ApprovalStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CashAdvanceDetail>, AppError> {
        let query = format!(
            r#"{}
            WHERE a.program_id = $1
              AND ($2::BIGINT IS NULL OR a.person_id = $2)
              AND ($3::approval_status IS NULL OR a.status = $3)
              AND ($4::DATE IS NULL OR a.week_start_date >= $4)
              AND ($5::DATE IS NULL OR a.week_start_date <= $5)
            ORDER BY a.week_start_date DESC, a.id DESC
            "#,
            DETAIL_SELECT
        );

        let details = sqlx::query_as::<_, CashAdvanceDetail>(&query)
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
