// src/services/advance_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        advance_repo::DUPLICATE_ADVANCE, CashAdvanceRepository, PersonRepository,
        ProgramRepository, TransactionRepository,
    },
    models::{
        advance::{CashAdvanceDetail, NewCashAdvance},
        auth::Actor,
        status::ApprovalStatus,
    },
    settlement::{
        advance::{advance_limit, cap_percentage},
        transitions::{plan_transition, ApprovalAction},
    },
};

#[derive(Clone)]
pub struct CashAdvanceService {
    pool: PgPool,
    advance_repo: CashAdvanceRepository,
    person_repo: PersonRepository,
    program_repo: ProgramRepository,
    transaction_repo: TransactionRepository,
    default_cap_percentage: Decimal,
}

impl CashAdvanceService {
    pub fn new(
        pool: PgPool,
        advance_repo: CashAdvanceRepository,
        person_repo: PersonRepository,
        program_repo: ProgramRepository,
        transaction_repo: TransactionRepository,
        default_cap_percentage: Decimal,
    ) -> Self {
        Self {
            pool,
            advance_repo,
            person_repo,
            program_repo,
            transaction_repo,
            default_cap_percentage,
        }
    }

    /// Pedido de adiantamento. Guarda as vendas aprovadas da semana como snapshot
    /// e recusa valores acima do percentual permitido.
    pub async fn request(
        &self,
        program_id: i64,
        actor: &Actor,
        input: NewCashAdvance,
    ) -> Result<CashAdvanceDetail, AppError> {
        if input.week_end_date < input.week_start_date {
            return Err(AppError::InvalidInput(
                "o fim da semana não pode ser anterior ao início".into(),
            ));
        }
        if input.advance_amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("o valor do adiantamento deve ser positivo".into()));
        }

        let mut tx = self.pool.begin().await?;

        let person = self
            .person_repo
            .find_in_program(&mut *tx, program_id, input.person_id)
            .await?
            .ok_or(AppError::ResourceNotFound("person"))?;

        if self
            .advance_repo
            .active_exists_for_week(&mut *tx, person.id, input.week_start_date, input.week_end_date)
            .await?
        {
            return Err(AppError::Conflict(DUPLICATE_ADVANCE.into()));
        }

        let weekly_sales = self
            .transaction_repo
            .approved_total(
                &mut *tx,
                program_id,
                person.id,
                person.person_type,
                input.week_start_date,
                input.week_end_date,
            )
            .await?;

        let config = self.program_repo.financial_config(&mut *tx, program_id).await?;
        let cap = cap_percentage(person.person_type, config.as_ref(), self.default_cap_percentage);
        let limit = advance_limit(weekly_sales, cap);

        if input.advance_amount > limit {
            return Err(AppError::AdvanceLimitExceeded {
                requested: input.advance_amount,
                limit,
            });
        }

        let created = self
            .advance_repo
            .insert(&mut *tx, program_id, &input, weekly_sales, actor.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            advance_id = created.id,
            person_id = created.person_id,
            amount = %created.advance_amount,
            weekly_sales = %weekly_sales,
            "Adiantamento solicitado"
        );

        self.get(program_id, created.id).await
    }

    pub async fn approve(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
    ) -> Result<CashAdvanceDetail, AppError> {
        self.transition(program_id, id, actor, ApprovalAction::Approve).await
    }

    pub async fn reject(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
    ) -> Result<CashAdvanceDetail, AppError> {
        self.transition(program_id, id, actor, ApprovalAction::Reject).await
    }

    async fn transition(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
        action: ApprovalAction,
    ) -> Result<CashAdvanceDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .advance_repo
            .lock(&mut *tx, program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("cash_advance"))?;

        let transition = plan_transition(current.status, action)?;
        self.advance_repo.set_status(&mut *tx, id, transition.to).await?;

        tx.commit().await?;

        tracing::info!(
            advance_id = id,
            actor_id = actor.id,
            to = transition.to.as_str(),
            "Transição de adiantamento aplicada"
        );

        self.get(program_id, id).await
    }

    pub async fn get(&self, program_id: i64, id: i64) -> Result<CashAdvanceDetail, AppError> {
        self.advance_repo
            .find_detail(program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("cash_advance"))
    }

    pub async fn list(
        &self,
        program_id: i64,
        person_id: Option<i64>,
        status: Option<ApprovalStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CashAdvanceDetail>, AppError> {
        self.advance_repo
            .list_details(program_id, person_id, status, from, to)
            .await
    }
}
