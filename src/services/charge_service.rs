// src/services/charge_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ChargeRepository, PersonRepository},
    models::{
        auth::Actor,
        charge::{ChargeDetail, ChargeStatus, NewCharge},
    },
    settlement::transitions::{plan_charge_transition, ChargeAction},
};

#[derive(Clone)]
pub struct ChargeService {
    pool: PgPool,
    charge_repo: ChargeRepository,
    person_repo: PersonRepository,
}

impl ChargeService {
    pub fn new(pool: PgPool, charge_repo: ChargeRepository, person_repo: PersonRepository) -> Self {
        Self { pool, charge_repo, person_repo }
    }

    pub async fn create(
        &self,
        program_id: i64,
        actor: &Actor,
        input: NewCharge,
    ) -> Result<ChargeDetail, AppError> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("o valor da cobrança deve ser positivo".into()));
        }
        if input.status == ChargeStatus::Cancelled {
            return Err(AppError::InvalidInput("uma cobrança não nasce cancelada".into()));
        }

        self.person_repo
            .find_in_program(&self.pool, program_id, input.person_id)
            .await?
            .ok_or(AppError::ResourceNotFound("person"))?;

        let created = self
            .charge_repo
            .insert(&self.pool, program_id, &input, actor.id)
            .await?;

        tracing::info!(
            charge_id = created.id,
            person_id = created.person_id,
            amount = %created.amount,
            "Cobrança criada"
        );

        self.get(program_id, created.id).await
    }

    pub async fn apply(&self, program_id: i64, id: i64, actor: &Actor) -> Result<ChargeDetail, AppError> {
        self.transition(program_id, id, actor, ChargeAction::Apply).await
    }

    pub async fn cancel(&self, program_id: i64, id: i64, actor: &Actor) -> Result<ChargeDetail, AppError> {
        self.transition(program_id, id, actor, ChargeAction::Cancel).await
    }

    async fn transition(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
        action: ChargeAction,
    ) -> Result<ChargeDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .charge_repo
            .lock(&mut *tx, program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("charge"))?;

        let next = plan_charge_transition(current.status, action)?;
        self.charge_repo.set_status(&mut *tx, id, next).await?;

        tx.commit().await?;

        tracing::info!(charge_id = id, actor_id = actor.id, status = ?next, "Transição de cobrança aplicada");

        self.get(program_id, id).await
    }

    pub async fn get(&self, program_id: i64, id: i64) -> Result<ChargeDetail, AppError> {
        self.charge_repo
            .find_detail(program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("charge"))
    }

    pub async fn list(
        &self,
        program_id: i64,
        person_id: Option<i64>,
        status: Option<ChargeStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ChargeDetail>, AppError> {
        self.charge_repo
            .list_details(program_id, person_id, status, from, to)
            .await
    }
}
