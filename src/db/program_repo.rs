// src/db/program_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::program::{ProgramExpenseBudget, ProgramFinancialConfig},
};

// Configuração do programa: somente leitura para o motor
#[derive(Clone)]
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ids da lista que não existem na tabela `programs`.
    pub async fn missing_program_ids(&self, program_ids: &[i64]) -> Result<Vec<i64>, AppError> {
        let missing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT requested.id
            FROM UNNEST($1::BIGINT[]) AS requested(id)
            WHERE NOT EXISTS (SELECT 1 FROM programs p WHERE p.id = requested.id)
            ORDER BY requested.id
            "#,
        )
        .bind(program_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(missing)
    }

    pub async fn financial_config<'e, E>(
        &self,
        executor: E,
        program_id: i64,
    ) -> Result<Option<ProgramFinancialConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let config = sqlx::query_as::<_, ProgramFinancialConfig>(
            r#"
            SELECT program_id, colporter_percentage, leader_percentage,
                   colporter_cash_advance_percentage, leader_cash_advance_percentage,
                   allow_budget_override
            FROM program_financial_configs
            WHERE program_id = $1
            "#,
        )
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(config)
    }

    /// Percentual individual ativo do líder no programa, se houver.
    pub async fn active_leader_percentage<'e, E>(
        &self,
        executor: E,
        leader_id: i64,
        program_id: i64,
    ) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let percentage = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT percentage
            FROM leader_percentages
            WHERE leader_id = $1 AND program_id = $2 AND is_active
            "#,
        )
        .bind(leader_id)
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(percentage)
    }

    /// Lê o orçamento da categoria travando a linha até o fim da transação.
    /// Despesas concorrentes da mesma categoria passam uma de cada vez.
    pub async fn lock_budget<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        category: &str,
    ) -> Result<Option<ProgramExpenseBudget>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let budget = sqlx::query_as::<_, ProgramExpenseBudget>(
            r#"
            SELECT id, program_id, category, budget_amount
            FROM program_expense_budgets
            WHERE program_id = $1 AND category = $2
            FOR UPDATE
            "#,
        )
        .bind(program_id)
        .bind(category)
        .fetch_optional(executor)
        .await?;
        Ok(budget)
    }
}
