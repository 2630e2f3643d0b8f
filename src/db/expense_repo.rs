// src/db/expense_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        expense::{BudgetStatus, Expense, ExpenseDetail, ExpenseFilter, NewExpense},
        status::ApprovalStatus,
    },
};

const DETAIL_SELECT: &str = r#"
    SELECT e.id, e.program_id, e.leader_id, e.for_leader_id, e.amount, e.category,
           e.expense_date, e.notes, e.status, e.parent_expense_id, e.is_parent_expense,
           e.created_by, e.created_at, e.updated_at,
           (l.first_name || ' ' || l.last_name) AS leader_name,
           (f.first_name || ' ' || f.last_name) AS for_leader_name
    FROM expenses e
    LEFT JOIN people l ON l.id = e.leader_id
    LEFT JOIN people f ON f.id = e.for_leader_id
"#;

#[derive(Clone)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        expense: &NewExpense,
        parent_expense_id: Option<i64>,
        is_parent_expense: bool,
        created_by: i64,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses
                (program_id, leader_id, for_leader_id, amount, category, expense_date,
                 notes, status, parent_expense_id, is_parent_expense, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(program_id)
        .bind(expense.leader_id)
        .bind(expense.for_leader_id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(expense.expense_date)
        .bind(&expense.notes)
        .bind(expense.status)
        .bind(parent_expense_id)
        .bind(is_parent_expense)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }

    /// Gasto aprovado da categoria no programa.
    /// Linhas agregadoras não entram: as filhas já carregam o valor.
    pub async fn approved_spending<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        category: &str,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE program_id = $1
              AND category = $2
              AND status = 'APPROVED'
              AND NOT is_parent_expense
            "#,
        )
        .bind(program_id)
        .bind(category)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn lock<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        id: i64,
    ) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE id = $1 AND program_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(expense)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: ApprovalStatus,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    /// Soma das despesas aprovadas lançadas para o líder no período.
    pub async fn approved_total_for_leader<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        leader_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE program_id = $1
              AND leader_id = $2
              AND status = 'APPROVED'
              AND expense_date BETWEEN $3 AND $4
            "#,
        )
        .bind(program_id)
        .bind(leader_id)
        .bind(from)
        .bind(to)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // ---
    // Leitura (pool)
    // ---

    pub async fn find_details(
        &self,
        program_id: i64,
        ids: &[i64],
    ) -> Result<Vec<ExpenseDetail>, AppError> {
        let query = format!(
            "{} WHERE e.program_id = $1 AND e.id = ANY($2) ORDER BY e.id",
            DETAIL_SELECT
        );
        let details = sqlx::query_as::<_, ExpenseDetail>(&query)
            .bind(program_id)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }

    pub async fn find_detail(&self, program_id: i64, id: i64) -> Result<Option<ExpenseDetail>, AppError> {
        Ok(self.find_details(program_id, &[id]).await?.into_iter().next())
    }

    pub async fn list_details(
        &self,
        program_id: i64,
        filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseDetail>, AppError> {
        let query = format!(
            r#"{}
            WHERE e.program_id = $1
              AND ($2::DATE IS NULL OR e.expense_date >= $2)
              AND ($3::DATE IS NULL OR e.expense_date <= $3)
              AND ($4::approval_status IS NULL OR e.status = $4)
              AND ($5::TEXT IS NULL OR e.category = $5)
              AND ($6::BIGINT IS NULL OR e.leader_id = $6)
              AND ($7::BIGINT IS NULL OR e.parent_expense_id = $7)
            ORDER BY e.expense_date DESC, e.id DESC
            "#,
            DETAIL_SELECT
        );

        let details = sqlx::query_as::<_, ExpenseDetail>(&query)
            .bind(program_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status)
            .bind(filter.category.as_deref())
            .bind(filter.leader_id)
            .bind(filter.parent_expense_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(details)
    }

    /// Orçamento, gasto aprovado, gasto pendente e saldo de cada categoria com orçamento.
    pub async fn budget_status(&self, program_id: i64) -> Result<Vec<BudgetStatus>, AppError> {
        let rows = sqlx::query_as::<_, BudgetStatus>(
            r#"
            SELECT b.category,
                   b.budget_amount AS budget,
                   COALESCE(SUM(e.amount) FILTER (WHERE e.status = 'APPROVED'), 0) AS approved_spending,
                   COALESCE(SUM(e.amount) FILTER (WHERE e.status = 'PENDING'), 0) AS pending_spending,
                   GREATEST(
                       b.budget_amount - COALESCE(SUM(e.amount) FILTER (WHERE e.status = 'APPROVED'), 0),
                       0
                   ) AS remaining
            FROM program_expense_budgets b
            LEFT JOIN expenses e
                   ON e.program_id = b.program_id
                  AND e.category = b.category
                  AND NOT e.is_parent_expense
            WHERE b.program_id = $1
            GROUP BY b.category, b.budget_amount
            ORDER BY b.category
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
