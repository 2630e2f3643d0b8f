// src/db/report_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::report::{ReportBookLine, ReportTransactionRow},
};

// Leitura crua para os relatórios; toda a agregação fica em `settlement::report`
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn approved_transactions(
        &self,
        program_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReportTransactionRow>, AppError> {
        let rows = sqlx::query_as::<_, ReportTransactionRow>(
            r#"
            SELECT t.id, t.student_id,
                   (s.first_name || ' ' || s.last_name) AS student_name,
                   t.leader_id,
                   (l.first_name || ' ' || l.last_name) AS leader_name,
                   t.transaction_date, t.cash, t.checks, t.atm_mobile, t.paypal, t.total
            FROM transactions t
            JOIN people s ON s.id = t.student_id
            JOIN people l ON l.id = t.leader_id
            WHERE t.program_id = $1
              AND t.status = 'APPROVED'
              AND t.transaction_date BETWEEN $2 AND $3
            ORDER BY t.transaction_date, t.id
            "#,
        )
        .bind(program_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn approved_book_lines(
        &self,
        program_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReportBookLine>, AppError> {
        let rows = sqlx::query_as::<_, ReportBookLine>(
            r#"
            SELECT tb.transaction_id, tb.book_id, b.title,
                   b.price AS catalog_price,
                   tb.quantity::BIGINT AS quantity
            FROM transaction_books tb
            JOIN transactions t ON t.id = tb.transaction_id
            JOIN books b ON b.id = tb.book_id
            WHERE t.program_id = $1
              AND t.status = 'APPROVED'
              AND t.transaction_date BETWEEN $2 AND $3
            ORDER BY tb.transaction_id, tb.id
            "#,
        )
        .bind(program_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
