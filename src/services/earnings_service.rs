// src/services/earnings_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{
        CashAdvanceRepository, ChargeRepository, ExpenseRepository, PersonRepository,
        ProgramRepository, TransactionRepository,
    },
    models::{
        earnings::{Deductions, EarningsReport},
        person::PersonType,
    },
    settlement::{
        commission::{resolve_percentage, summarize, CommissionDefaults},
        netting::settle,
    },
};

pub(crate) fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), AppError> {
    if from > to {
        return Err(AppError::InvalidInput(format!(
            "período inválido: {} é posterior a {}",
            from, to
        )));
    }
    Ok(())
}

// Calculadora de comissão + acerto (cobranças, adiantamentos, despesas)
#[derive(Clone)]
pub struct EarningsService {
    pool: PgPool,
    person_repo: PersonRepository,
    program_repo: ProgramRepository,
    transaction_repo: TransactionRepository,
    charge_repo: ChargeRepository,
    advance_repo: CashAdvanceRepository,
    expense_repo: ExpenseRepository,
    defaults: CommissionDefaults,
}

impl EarningsService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        person_repo: PersonRepository,
        program_repo: ProgramRepository,
        transaction_repo: TransactionRepository,
        charge_repo: ChargeRepository,
        advance_repo: CashAdvanceRepository,
        expense_repo: ExpenseRepository,
        defaults: CommissionDefaults,
    ) -> Self {
        Self {
            pool,
            person_repo,
            program_repo,
            transaction_repo,
            charge_repo,
            advance_repo,
            expense_repo,
            defaults,
        }
    }

    pub async fn earnings(
        &self,
        program_id: i64,
        person_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<EarningsReport, AppError> {
        check_range(from, to)?;

        let person = self
            .person_repo
            .find_in_program(&self.pool, program_id, person_id)
            .await?
            .ok_or(AppError::ResourceNotFound("person"))?;

        // 1. Percentual
        let config = self.program_repo.financial_config(&self.pool, program_id).await?;
        let leader_override = match person.person_type {
            PersonType::Leader => {
                self.program_repo
                    .active_leader_percentage(&self.pool, person.id, program_id)
                    .await?
            }
            PersonType::Colporter => None,
        };
        let percentage =
            resolve_percentage(person.person_type, leader_override, config.as_ref(), self.defaults);

        // 2. Bruto e líquido
        let sales = self
            .transaction_repo
            .approved_sales(&self.pool, program_id, person.id, person.person_type, from, to)
            .await?;
        let books = self
            .transaction_repo
            .approved_book_quantities(&self.pool, program_id, person.id, person.person_type, from, to)
            .await?;
        let commission = summarize(&sales, &books, percentage);

        // 3. Descontos
        let charges = self
            .charge_repo
            .applied_total(&self.pool, program_id, person.id, from, to)
            .await?;
        let advances = self
            .advance_repo
            .approved_total(&self.pool, program_id, person.id, from, to)
            .await?;
        let expenses = match person.person_type {
            PersonType::Leader => {
                self.expense_repo
                    .approved_total_for_leader(&self.pool, program_id, person.id, from, to)
                    .await?
            }
            PersonType::Colporter => Decimal::ZERO,
        };
        let deductions = Deductions::for_person(person.person_type, charges, advances, expenses);
        let final_amount = settle(commission.net, &deductions);

        tracing::debug!(
            person_id,
            gross = %commission.gross,
            net = %commission.net,
            final_amount = %final_amount,
            "Ganhos calculados"
        );

        Ok(EarningsReport {
            person_id: person.id,
            person_name: person.full_name(),
            person_type: person.person_type,
            program_id,
            from,
            to,
            commission,
            deductions,
            final_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_must_be_ordered() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        assert!(check_range(d(1), d(30)).is_ok());
        assert!(check_range(d(15), d(15)).is_ok());
        assert!(matches!(check_range(d(30), d(1)), Err(AppError::InvalidInput(_))));
    }
}
