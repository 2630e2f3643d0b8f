// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};

use crate::common::error::AppError;

// Estoque por programa (`program_books`).
// `sold` só muda aqui, sempre com updates relativos.
#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    /// Preço de uma linha sem preço explícito: o do programa, senão o do catálogo.
    /// `None` quando o livro não existe.
    pub async fn default_price<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        book_id: i64,
    ) -> Result<Option<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let price = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(pb.price, b.price)
            FROM books b
            LEFT JOIN program_books pb ON pb.book_id = b.id AND pb.program_id = $1
            WHERE b.id = $2
            "#,
        )
        .bind(program_id)
        .bind(book_id)
        .fetch_optional(executor)
        .await?;
        Ok(price)
    }

    /// Soma `quantity` ao vendido. Cria a linha do programa com o preço do catálogo se faltar.
    pub async fn increment_sold<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        book_id: i64,
        quantity: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sold = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO program_books (program_id, book_id, price, initial_stock, sold)
            SELECT $1, b.id, b.price, 0, $3
            FROM books b
            WHERE b.id = $2
            ON CONFLICT (program_id, book_id)
            DO UPDATE SET sold = program_books.sold + EXCLUDED.sold
            RETURNING sold
            "#,
        )
        .bind(program_id)
        .bind(book_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ResourceNotFound("book"))?;
        Ok(sold)
    }

    /// Trava a linha de estoque e devolve o vendido atual.
    pub async fn lock_sold<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        book_id: i64,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sold = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT sold
            FROM program_books
            WHERE program_id = $1 AND book_id = $2
            FOR UPDATE
            "#,
        )
        .bind(program_id)
        .bind(book_id)
        .fetch_optional(executor)
        .await?;
        Ok(sold)
    }

    /// `sold = GREATEST(sold - quantity, 0)`. Retorna o novo valor.
    pub async fn decrement_sold_floored<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        book_id: i64,
        quantity: i32,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sold = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE program_books
            SET sold = GREATEST(sold - $3, 0)
            WHERE program_id = $1 AND book_id = $2
            RETURNING sold
            "#,
        )
        .bind(program_id)
        .bind(book_id)
        .bind(quantity)
        .fetch_optional(executor)
        .await?;
        Ok(sold)
    }
}
