// src/services/expense_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ExpenseRepository, PersonRepository, ProgramRepository},
    models::{
        auth::Actor,
        expense::{
            BudgetStatus, ExpenseDetail, ExpenseDistribution, ExpenseFilter, NewExpense,
            INCENTIVES_CATEGORY,
        },
        person::PersonType,
        status::ApprovalStatus,
    },
    settlement::{
        budget::check_budget,
        distribution::{plan_distribution, IncentiveShare},
        transitions::{plan_transition, ApprovalAction},
    },
};

/// Pedido de rateio proporcional de incentivos entre líderes.
#[derive(Debug, Clone)]
pub struct DistributionRequest {
    pub category: String,
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
    pub status: ApprovalStatus,
    pub shares: Vec<IncentiveShare>,
}

#[derive(Clone)]
pub struct ExpenseService {
    pool: PgPool,
    expense_repo: ExpenseRepository,
    program_repo: ProgramRepository,
    person_repo: PersonRepository,
}

impl ExpenseService {
    pub fn new(
        pool: PgPool,
        expense_repo: ExpenseRepository,
        program_repo: ProgramRepository,
        person_repo: PersonRepository,
    ) -> Self {
        Self { pool, expense_repo, program_repo, person_repo }
    }

    async fn check_leader(
        &self,
        conn: &mut sqlx::PgConnection,
        program_id: i64,
        leader_id: Option<i64>,
    ) -> Result<(), AppError> {
        if let Some(id) = leader_id {
            self.person_repo
                .find_typed(&mut *conn, program_id, id, PersonType::Leader)
                .await?
                .ok_or(AppError::ResourceNotFound("leader"))?;
        }
        Ok(())
    }

    // Orçamento da categoria, com a linha travada até o commit.
    // Despesas de líder e programas com override não passam por aqui.
    async fn enforce_budget(
        &self,
        conn: &mut sqlx::PgConnection,
        program_id: i64,
        category: &str,
        candidate: Decimal,
    ) -> Result<(), AppError> {
        let config = self.program_repo.financial_config(&mut *conn, program_id).await?;
        if config.map(|c| c.allow_budget_override).unwrap_or(false) {
            return Ok(());
        }

        let budget = self
            .program_repo
            .lock_budget(&mut *conn, program_id, category)
            .await?;
        let current = self
            .expense_repo
            .approved_spending(&mut *conn, program_id, category)
            .await?;

        check_budget(category, budget.map(|b| b.budget_amount), current, candidate).map_err(|info| {
            tracing::info!(
                program_id,
                category,
                requested = %info.requested_amount,
                remaining = %info.remaining,
                "Despesa recusada pelo orçamento"
            );
            AppError::BudgetExceeded(info)
        })
    }

    pub async fn create(
        &self,
        program_id: i64,
        actor: &Actor,
        input: NewExpense,
    ) -> Result<ExpenseDetail, AppError> {
        if input.amount < Decimal::ZERO {
            return Err(AppError::InvalidInput("o valor da despesa não pode ser negativo".into()));
        }

        let mut tx = self.pool.begin().await?;

        self.check_leader(&mut tx, program_id, input.leader_id).await?;
        self.check_leader(&mut tx, program_id, input.for_leader_id).await?;

        if input.leader_id.is_none() {
            self.enforce_budget(&mut tx, program_id, &input.category, input.amount)
                .await?;
        }

        let created = self
            .expense_repo
            .insert(&mut *tx, program_id, &input, None, false, actor.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            expense_id = created.id,
            category = %created.category,
            amount = %created.amount,
            "Despesa criada"
        );

        self.get(program_id, created.id).await
    }

    /// Uma linha agregadora (pai) e uma filha por fatia positiva, tudo ou nada.
    pub async fn distribute(
        &self,
        program_id: i64,
        actor: &Actor,
        request: DistributionRequest,
    ) -> Result<ExpenseDistribution, AppError> {
        if request.category != INCENTIVES_CATEGORY {
            return Err(AppError::InvalidInput(format!(
                "rateio proporcional só é permitido na categoria '{}'",
                INCENTIVES_CATEGORY
            )));
        }
        if request.shares.is_empty() {
            return Err(AppError::InvalidInput("informe ao menos um líder no rateio".into()));
        }
        if request.shares.iter().any(|s| {
            s.total_sales < Decimal::ZERO
                || s.percentage < Decimal::ZERO
                || s.percentage > Decimal::ONE_HUNDRED
        }) {
            return Err(AppError::InvalidInput(
                "vendas e percentuais do rateio devem ser positivos (percentual até 100)".into(),
            ));
        }

        let plan = plan_distribution(&request.shares);
        if plan.children.is_empty() {
            return Err(AppError::InvalidInput("nenhuma fatia do rateio tem valor positivo".into()));
        }

        let mut tx = self.pool.begin().await?;

        for child in &plan.children {
            self.check_leader(&mut tx, program_id, child.leader_id).await?;
        }

        self.enforce_budget(&mut tx, program_id, &request.category, plan.parent_amount)
            .await?;

        let parent = self
            .expense_repo
            .insert(
                &mut *tx,
                program_id,
                &NewExpense {
                    leader_id: None,
                    for_leader_id: None,
                    amount: plan.parent_amount,
                    category: request.category.clone(),
                    expense_date: request.expense_date,
                    notes: request.notes.clone(),
                    status: request.status,
                },
                None,
                true,
                actor.id,
            )
            .await?;

        let mut ids = vec![parent.id];
        for child in &plan.children {
            let created = self
                .expense_repo
                .insert(
                    &mut *tx,
                    program_id,
                    &NewExpense {
                        leader_id: child.leader_id,
                        for_leader_id: child.leader_id,
                        amount: child.amount,
                        category: request.category.clone(),
                        expense_date: request.expense_date,
                        notes: request.notes.clone(),
                        status: request.status,
                    },
                    Some(parent.id),
                    false,
                    actor.id,
                )
                .await?;
            ids.push(created.id);
        }

        tx.commit().await?;

        tracing::info!(
            parent_expense_id = parent.id,
            children = plan.children.len(),
            amount = %plan.parent_amount,
            "Rateio de incentivos criado"
        );

        let mut details = self.expense_repo.find_details(program_id, &ids).await?;
        let parent_pos = details
            .iter()
            .position(|d| d.expense.id == parent.id)
            .ok_or(AppError::ResourceNotFound("expense"))?;
        let parent = details.remove(parent_pos);

        Ok(ExpenseDistribution { parent, children: details })
    }

    pub async fn approve(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
    ) -> Result<ExpenseDetail, AppError> {
        self.transition(program_id, id, actor, ApprovalAction::Approve).await
    }

    pub async fn reject(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
    ) -> Result<ExpenseDetail, AppError> {
        self.transition(program_id, id, actor, ApprovalAction::Reject).await
    }

    async fn transition(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
        action: ApprovalAction,
    ) -> Result<ExpenseDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .expense_repo
            .lock(&mut *tx, program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("expense"))?;

        // a linha agregadora é informativa; aprova-se cada filha
        if current.is_parent_expense {
            return Err(AppError::InvalidInput(format!(
                "a despesa {} é agregadora de um rateio; aprove ou rejeite as filhas",
                id
            )));
        }

        let transition = plan_transition(current.status, action)?;
        self.expense_repo.set_status(&mut *tx, id, transition.to).await?;

        tx.commit().await?;

        tracing::info!(
            expense_id = id,
            actor_id = actor.id,
            to = transition.to.as_str(),
            "Transição de despesa aplicada"
        );

        self.get(program_id, id).await
    }

    pub async fn get(&self, program_id: i64, id: i64) -> Result<ExpenseDetail, AppError> {
        self.expense_repo
            .find_detail(program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("expense"))
    }

    pub async fn list(
        &self,
        program_id: i64,
        filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseDetail>, AppError> {
        self.expense_repo.list_details(program_id, filter).await
    }

    pub async fn budget_status(&self, program_id: i64) -> Result<Vec<BudgetStatus>, AppError> {
        self.expense_repo.budget_status(program_id).await
    }
}
