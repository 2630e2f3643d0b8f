// src/services/transaction_service.rs

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::{
        transaction_repo::DUPLICATE_TRANSACTION, InventoryRepository, PersonRepository,
        TransactionRepository,
    },
    models::{
        auth::Actor,
        person::PersonType,
        status::ApprovalStatus,
        transaction::{
            BookLineInput, InventoryShortfall, NewTransaction, PaymentAmounts, TransactionChanges,
            TransactionDetail, TransactionFilter, TransitionOutcome,
        },
    },
    settlement::transitions::{
        apply_floored, inventory_deltas, plan_transition, ApprovalAction, InventoryEffect,
    },
};

#[derive(Clone)]
pub struct TransactionService {
    pool: PgPool,
    transaction_repo: TransactionRepository,
    person_repo: PersonRepository,
    inventory_repo: InventoryRepository,
}

fn check_amounts(amounts: &PaymentAmounts) -> Result<(), AppError> {
    if amounts.has_negative() {
        return Err(AppError::InvalidInput(
            "os valores por forma de pagamento não podem ser negativos".into(),
        ));
    }
    Ok(())
}

fn to_quantity(value: i64) -> Result<i32, AppError> {
    i32::try_from(value)
        .map_err(|_| AppError::InvalidInput(format!("quantidade fora do limite: {}", value)))
}

impl TransactionService {
    pub fn new(
        pool: PgPool,
        transaction_repo: TransactionRepository,
        person_repo: PersonRepository,
        inventory_repo: InventoryRepository,
    ) -> Self {
        Self { pool, transaction_repo, person_repo, inventory_repo }
    }

    // Colportor e líder precisam existir no programa com o papel certo
    async fn check_people(
        &self,
        conn: &mut sqlx::PgConnection,
        program_id: i64,
        student_id: i64,
        leader_id: i64,
    ) -> Result<(), AppError> {
        self.person_repo
            .find_typed(&mut *conn, program_id, student_id, PersonType::Colporter)
            .await?
            .ok_or(AppError::ResourceNotFound("colporter"))?;
        self.person_repo
            .find_typed(&mut *conn, program_id, leader_id, PersonType::Leader)
            .await?
            .ok_or(AppError::ResourceNotFound("leader"))?;
        Ok(())
    }

    // Grava as linhas com o preço do momento: explícito, do programa ou do catálogo
    async fn insert_lines(
        &self,
        conn: &mut sqlx::PgConnection,
        program_id: i64,
        transaction_id: i64,
        lines: &[BookLineInput],
    ) -> Result<(), AppError> {
        for line in lines {
            if line.quantity <= 0 {
                return Err(AppError::InvalidInput(format!(
                    "quantidade inválida para o livro {}",
                    line.book_id
                )));
            }

            let price = match line.price {
                Some(price) if price < Decimal::ZERO => {
                    return Err(AppError::InvalidInput(format!(
                        "preço negativo para o livro {}",
                        line.book_id
                    )));
                }
                Some(price) => price,
                None => self
                    .inventory_repo
                    .default_price(&mut *conn, program_id, line.book_id)
                    .await?
                    .ok_or(AppError::ResourceNotFound("book"))?,
            };

            self.transaction_repo
                .insert_book_line(&mut *conn, transaction_id, line.book_id, line.quantity, price)
                .await?;
        }
        Ok(())
    }

    async fn load(&self, program_id: i64, id: i64) -> Result<TransactionDetail, AppError> {
        self.transaction_repo
            .find_detail(program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("transaction"))
    }

    pub async fn create(
        &self,
        program_id: i64,
        actor: &Actor,
        input: NewTransaction,
    ) -> Result<TransactionDetail, AppError> {
        check_amounts(&input.amounts)?;

        let mut tx = self.pool.begin().await?;

        self.check_people(&mut tx, program_id, input.student_id, input.leader_id)
            .await?;

        if self
            .transaction_repo
            .active_exists_for_day(&mut *tx, input.student_id, input.transaction_date, None)
            .await?
        {
            return Err(AppError::Conflict(DUPLICATE_TRANSACTION.into()));
        }

        let created = self
            .transaction_repo
            .insert(
                &mut *tx,
                program_id,
                input.student_id,
                input.leader_id,
                input.transaction_date,
                &input.amounts,
                actor.id,
            )
            .await?;

        self.insert_lines(&mut tx, program_id, created.id, &input.books)
            .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = created.id,
            student_id = created.student_id,
            total = %created.total,
            "Transação criada"
        );

        self.load(program_id, created.id).await
    }

    pub async fn get(&self, program_id: i64, id: i64) -> Result<TransactionDetail, AppError> {
        self.load(program_id, id).await
    }

    pub async fn list(
        &self,
        program_id: i64,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionDetail>, AppError> {
        self.transaction_repo.list_details(program_id, filter).await
    }

    /// Só transações PENDING são editáveis; o estoque nunca diverge das linhas aprovadas.
    pub async fn update(
        &self,
        program_id: i64,
        id: i64,
        changes: TransactionChanges,
    ) -> Result<TransactionDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .transaction_repo
            .lock(&mut *tx, program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("transaction"))?;

        if current.status != ApprovalStatus::Pending {
            return Err(AppError::Conflict(format!(
                "transação {} não pode ser editada no status {}",
                id,
                current.status.as_str()
            )));
        }

        let student_id = changes.student_id.unwrap_or(current.student_id);
        let leader_id = changes.leader_id.unwrap_or(current.leader_id);
        let transaction_date = changes.transaction_date.unwrap_or(current.transaction_date);
        let amounts = current.amounts().merge(&changes.amounts);
        check_amounts(&amounts)?;

        if student_id != current.student_id || leader_id != current.leader_id {
            self.check_people(&mut tx, program_id, student_id, leader_id)
                .await?;
        }

        if (student_id != current.student_id || transaction_date != current.transaction_date)
            && self
                .transaction_repo
                .active_exists_for_day(&mut *tx, student_id, transaction_date, Some(id))
                .await?
        {
            return Err(AppError::Conflict(DUPLICATE_TRANSACTION.into()));
        }

        self.transaction_repo
            .update_fields(&mut *tx, id, student_id, leader_id, transaction_date, &amounts)
            .await?;

        if let Some(books) = &changes.books {
            self.transaction_repo.delete_book_lines(&mut *tx, id).await?;
            self.insert_lines(&mut tx, program_id, id, books).await?;
        }

        tx.commit().await?;

        tracing::info!(transaction_id = id, "Transação atualizada");

        self.load(program_id, id).await
    }

    pub async fn approve(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
    ) -> Result<TransitionOutcome, AppError> {
        self.transition(program_id, id, actor, ApprovalAction::Approve).await
    }

    pub async fn reject(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
    ) -> Result<TransitionOutcome, AppError> {
        self.transition(program_id, id, actor, ApprovalAction::Reject).await
    }

    // Status e estoque mudam juntos, numa única transação do banco
    async fn transition(
        &self,
        program_id: i64,
        id: i64,
        actor: &Actor,
        action: ApprovalAction,
    ) -> Result<TransitionOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .transaction_repo
            .lock(&mut *tx, program_id, id)
            .await?
            .ok_or(AppError::ResourceNotFound("transaction"))?;

        let transition = plan_transition(current.status, action)?;

        let lines = self.transaction_repo.line_quantities(&mut *tx, id).await?;
        let deltas = inventory_deltas(lines, transition.inventory);

        let mut shortfalls = Vec::new();
        match transition.inventory {
            InventoryEffect::Increment => {
                for (book_id, delta) in deltas {
                    self.inventory_repo
                        .increment_sold(&mut *tx, program_id, book_id, to_quantity(delta)?)
                        .await?;
                }
            }
            InventoryEffect::Decrement => {
                for (book_id, delta) in deltas {
                    if let Some(shortfall) =
                        self.revert_sold(&mut tx, program_id, book_id, delta).await?
                    {
                        shortfalls.push(shortfall);
                    }
                }
            }
            InventoryEffect::None => {}
        }

        self.transaction_repo
            .set_status(&mut *tx, id, transition.to)
            .await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = id,
            actor_id = actor.id,
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            "Transição de transação aplicada"
        );

        Ok(TransitionOutcome {
            transaction: self.load(program_id, id).await?,
            inventory_shortfalls: shortfalls,
        })
    }

    // Estorno com piso em zero. O que o piso absorver é devolvido para conciliação.
    async fn revert_sold(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        program_id: i64,
        book_id: i64,
        delta: i64,
    ) -> Result<Option<InventoryShortfall>, AppError> {
        let previous = self
            .inventory_repo
            .lock_sold(&mut **tx, program_id, book_id)
            .await?;

        let previous_sold = i64::from(previous.unwrap_or(0));
        let (_, absorbed) = apply_floored(previous_sold, delta);

        if previous.is_some() {
            self.inventory_repo
                .decrement_sold_floored(&mut **tx, program_id, book_id, to_quantity(-delta)?)
                .await?;
        }

        if absorbed == 0 {
            return Ok(None);
        }

        tracing::warn!(
            program_id,
            book_id,
            requested = -delta,
            previous_sold,
            absorbed,
            "Estorno de estoque limitado pelo piso zero"
        );

        Ok(Some(InventoryShortfall {
            book_id,
            requested: -delta,
            previous_sold,
            absorbed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::auth::Role;

    struct Seed {
        program_id: i64,
        colporter_id: i64,
        leader_id: i64,
        book_id: i64,
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn service(pool: &PgPool) -> TransactionService {
        TransactionService::new(
            pool.clone(),
            TransactionRepository::new(pool.clone()),
            PersonRepository::new(pool.clone()),
            InventoryRepository::new(),
        )
    }

    fn actor(program_id: i64) -> Actor {
        Actor { id: 1, role: Role::Admin, current_program_id: Some(program_id) }
    }

    // Programa com um colportor, um líder e um livro com 10 vendidos
    async fn seed(pool: &PgPool) -> Seed {
        let program_id: i64 = sqlx::query_scalar(
            "INSERT INTO programs (name, start_date, end_date) VALUES ('Verão', '2025-06-01', '2025-08-31') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let person = |first: &'static str, person_type: PersonType| {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO people (program_id, first_name, last_name, email, person_type)
                VALUES ($1, $2, 'Teste', $2 || '@exemplo.com', $3)
                RETURNING id
                "#,
            )
            .bind(program_id)
            .bind(first)
            .bind(person_type)
            .fetch_one(pool)
        };
        let colporter_id = person("ana", PersonType::Colporter).await.unwrap();
        let leader_id = person("carlos", PersonType::Leader).await.unwrap();

        let book_id: i64 = sqlx::query_scalar(
            "INSERT INTO books (title, price) VALUES ('O Grande Conflito', 25.00) RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO program_books (program_id, book_id, price, initial_stock, sold) VALUES ($1, $2, 25.00, 50, 10)",
        )
        .bind(program_id)
        .bind(book_id)
        .execute(pool)
        .await
        .unwrap();

        Seed { program_id, colporter_id, leader_id, book_id }
    }

    fn new_sale(seed: &Seed, on: NaiveDate, quantity: i32) -> NewTransaction {
        NewTransaction {
            student_id: seed.colporter_id,
            leader_id: seed.leader_id,
            transaction_date: on,
            amounts: PaymentAmounts {
                cash: Decimal::new(75, 0),
                ..Default::default()
            },
            books: vec![BookLineInput { book_id: seed.book_id, quantity, price: None }],
        }
    }

    async fn sold(pool: &PgPool, seed: &Seed) -> i32 {
        sqlx::query_scalar("SELECT sold FROM program_books WHERE program_id = $1 AND book_id = $2")
            .bind(seed.program_id)
            .bind(seed.book_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn second_active_sale_on_the_same_day_conflicts(pool: PgPool) {
        let seed = seed(&pool).await;
        let service = service(&pool);
        let actor = actor(seed.program_id);

        let first = service.create(seed.program_id, &actor, new_sale(&seed, day(2), 1)).await.unwrap();
        assert_eq!(first.transaction.total, Decimal::new(75, 0));
        assert_eq!(first.books[0].price, Decimal::new(2500, 2));

        let duplicate = service.create(seed.program_id, &actor, new_sale(&seed, day(2), 1)).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        // rejeitada libera o dia
        service.reject(seed.program_id, first.transaction.id, &actor).await.unwrap();
        let again = service.create(seed.program_id, &actor, new_sale(&seed, day(2), 1)).await;
        assert!(again.is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_cannot_move_into_an_occupied_day(pool: PgPool) {
        let seed = seed(&pool).await;
        let service = service(&pool);
        let actor = actor(seed.program_id);

        service.create(seed.program_id, &actor, new_sale(&seed, day(2), 1)).await.unwrap();
        let second = service.create(seed.program_id, &actor, new_sale(&seed, day(3), 1)).await.unwrap();
        let id = second.transaction.id;

        let moved = service
            .update(
                seed.program_id,
                id,
                TransactionChanges { transaction_date: Some(day(2)), ..Default::default() },
            )
            .await;
        assert!(matches!(moved, Err(AppError::Conflict(_))));

        // mesma linha, mesmo dia: não conflita consigo mesma
        let mut changes = TransactionChanges {
            student_id: Some(seed.colporter_id),
            transaction_date: Some(day(3)),
            ..Default::default()
        };
        changes.amounts.paypal = Some(Decimal::new(5, 0));
        let updated = service.update(seed.program_id, id, changes).await.unwrap();
        assert_eq!(updated.transaction.transaction_date, day(3));
        assert_eq!(updated.transaction.total, Decimal::new(80, 0));

        let free_day = service
            .update(
                seed.program_id,
                id,
                TransactionChanges { transaction_date: Some(day(4)), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(free_day.transaction.transaction_date, day(4));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn approve_then_reject_restores_sold(pool: PgPool) {
        let seed = seed(&pool).await;
        let service = service(&pool);
        let actor = actor(seed.program_id);

        let created = service.create(seed.program_id, &actor, new_sale(&seed, day(2), 3)).await.unwrap();
        let id = created.transaction.id;

        let approved = service.approve(seed.program_id, id, &actor).await.unwrap();
        assert_eq!(approved.transaction.transaction.status, ApprovalStatus::Approved);
        assert_eq!(sold(&pool, &seed).await, 13);

        let rejected = service.reject(seed.program_id, id, &actor).await.unwrap();
        assert_eq!(rejected.transaction.transaction.status, ApprovalStatus::Rejected);
        assert!(rejected.inventory_shortfalls.is_empty());
        assert_eq!(sold(&pool, &seed).await, 10);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rejecting_pending_sale_leaves_stock_alone(pool: PgPool) {
        let seed = seed(&pool).await;
        let service = service(&pool);
        let actor = actor(seed.program_id);

        let created = service.create(seed.program_id, &actor, new_sale(&seed, day(2), 3)).await.unwrap();
        let rejected = service.reject(seed.program_id, created.transaction.id, &actor).await.unwrap();

        assert_eq!(rejected.transaction.transaction.status, ApprovalStatus::Rejected);
        assert!(rejected.inventory_shortfalls.is_empty());
        assert_eq!(sold(&pool, &seed).await, 10);

        let again = service.approve(seed.program_id, created.transaction.id, &actor).await;
        assert!(again.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn reversal_is_floored_at_zero_and_reported(pool: PgPool) {
        let seed = seed(&pool).await;
        let service = service(&pool);
        let actor = actor(seed.program_id);

        let created = service.create(seed.program_id, &actor, new_sale(&seed, day(2), 3)).await.unwrap();
        let id = created.transaction.id;
        service.approve(seed.program_id, id, &actor).await.unwrap();

        // ajuste manual de estoque entre a aprovação e a rejeição
        sqlx::query("UPDATE program_books SET sold = 1 WHERE program_id = $1 AND book_id = $2")
            .bind(seed.program_id)
            .bind(seed.book_id)
            .execute(&pool)
            .await
            .unwrap();

        let rejected = service.reject(seed.program_id, id, &actor).await.unwrap();
        assert_eq!(sold(&pool, &seed).await, 0);

        let shortfall = &rejected.inventory_shortfalls[0];
        assert_eq!(shortfall.book_id, seed.book_id);
        assert_eq!(shortfall.requested, 3);
        assert_eq!(shortfall.previous_sold, 1);
        assert_eq!(shortfall.absorbed, 2);
    }
}
