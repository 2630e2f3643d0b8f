// src/db/transaction_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::conflict_on_unique, error::AppError},
    models::{
        earnings::{BookQuantityRow, SaleRow},
        person::PersonType,
        status::ApprovalStatus,
        transaction::{
            PaymentAmounts, Transaction, TransactionBookLine, TransactionDetail, TransactionFilter,
        },
    },
};

pub(crate) const DUPLICATE_TRANSACTION: &str =
    "já existe uma transação pendente ou aprovada para este colportor nesta data";

// Transação + nomes legíveis do colportor e do líder
const DETAIL_SELECT: &str = r#"
    SELECT t.id, t.program_id, t.student_id, t.leader_id,
           t.cash, t.checks, t.atm_mobile, t.paypal, t.total,
           t.transaction_date, t.status, t.created_by, t.created_at, t.updated_at,
           (s.first_name || ' ' || s.last_name) AS student_name,
           (l.first_name || ' ' || l.last_name) AS leader_name
    FROM transactions t
    JOIN people s ON s.id = t.student_id
    JOIN people l ON l.id = t.leader_id
"#;

// Agregados de vendas aprovadas. A pessoa entra como colportor (student_id)
// ou como líder (leader_id), conforme o tipo em $5.
const APPROVED_SALES: &str = r#"
    SELECT t.transaction_date, t.total
    FROM transactions t
    WHERE t.program_id = $1
      AND (($5::person_type = 'COLPORTER' AND t.student_id = $2)
           OR ($5::person_type = 'LEADER' AND t.leader_id = $2))
      AND t.status = 'APPROVED'
      AND t.transaction_date BETWEEN $3 AND $4
    ORDER BY t.transaction_date, t.id
"#;

const APPROVED_BOOK_QUANTITIES: &str = r#"
    SELECT b.price AS catalog_price, SUM(tb.quantity)::BIGINT AS quantity
    FROM transaction_books tb
    JOIN transactions t ON t.id = tb.transaction_id
    JOIN books b ON b.id = tb.book_id
    WHERE t.program_id = $1
      AND (($5::person_type = 'COLPORTER' AND t.student_id = $2)
           OR ($5::person_type = 'LEADER' AND t.leader_id = $2))
      AND t.status = 'APPROVED'
      AND t.transaction_date BETWEEN $3 AND $4
    GROUP BY tb.book_id, b.price
    ORDER BY tb.book_id
"#;

const APPROVED_TOTAL: &str = r#"
    SELECT COALESCE(SUM(t.total), 0)
    FROM transactions t
    WHERE t.program_id = $1
      AND (($5::person_type = 'COLPORTER' AND t.student_id = $2)
           OR ($5::person_type = 'LEADER' AND t.leader_id = $2))
      AND t.status = 'APPROVED'
      AND t.transaction_date BETWEEN $3 AND $4
"#;

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Escrita (sempre dentro de uma transação do serviço)
    // ---

    /// Existe outra transação PENDING/APPROVED do colportor nesta data?
    pub async fn active_exists_for_day<'e, E>(
        &self,
        executor: E,
        student_id: i64,
        transaction_date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM transactions
                WHERE student_id = $1
                  AND transaction_date = $2
                  AND status IN ('PENDING', 'APPROVED')
                  AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(student_id)
        .bind(transaction_date)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        student_id: i64,
        leader_id: i64,
        transaction_date: NaiveDate,
        amounts: &PaymentAmounts,
        created_by: i64,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (program_id, student_id, leader_id, cash, checks, atm_mobile, paypal,
                 total, transaction_date, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'PENDING', $10)
            RETURNING *
            "#,
        )
        .bind(program_id)
        .bind(student_id)
        .bind(leader_id)
        .bind(amounts.cash)
        .bind(amounts.checks)
        .bind(amounts.atm_mobile)
        .bind(amounts.paypal)
        .bind(amounts.total())
        .bind(transaction_date)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_TRANSACTION))
    }

    pub async fn insert_book_line<'e, E>(
        &self,
        executor: E,
        transaction_id: i64,
        book_id: i64,
        quantity: i32,
        price: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO transaction_books (transaction_id, book_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(transaction_id)
        .bind(book_id)
        .bind(quantity)
        .bind(price)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_book_lines<'e, E>(
        &self,
        executor: E,
        transaction_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM transaction_books WHERE transaction_id = $1")
            .bind(transaction_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Trava a transação para a mudança de estado.
    pub async fn lock<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        id: i64,
    ) -> Result<Option<Transaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tx = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 AND program_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(tx)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: i64,
        status: ApprovalStatus,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_TRANSACTION))
    }

    /// Grava os campos editáveis; o total é sempre recalculado dos quatro valores.
    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: i64,
        student_id: i64,
        leader_id: i64,
        transaction_date: NaiveDate,
        amounts: &PaymentAmounts,
    ) -> Result<Transaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET student_id = $2, leader_id = $3, transaction_date = $4,
                cash = $5, checks = $6, atm_mobile = $7, paypal = $8, total = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(student_id)
        .bind(leader_id)
        .bind(transaction_date)
        .bind(amounts.cash)
        .bind(amounts.checks)
        .bind(amounts.atm_mobile)
        .bind(amounts.paypal)
        .bind(amounts.total())
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_TRANSACTION))
    }

    /// (book_id, quantidade) de cada linha da transação.
    pub async fn line_quantities<'e, E>(
        &self,
        executor: E,
        transaction_id: i64,
    ) -> Result<Vec<(i64, i32)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, (i64, i32)>(
            "SELECT book_id, quantity FROM transaction_books WHERE transaction_id = $1 ORDER BY book_id",
        )
        .bind(transaction_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    // ---
    // Leitura (pool)
    // ---

    pub async fn find_detail(
        &self,
        program_id: i64,
        id: i64,
    ) -> Result<Option<TransactionDetail>, AppError> {
        let query = format!("{} WHERE t.id = $1 AND t.program_id = $2", DETAIL_SELECT);
        let detail = sqlx::query_as::<_, TransactionDetail>(&query)
            .bind(id)
            .bind(program_id)
            .fetch_optional(&self.pool)
            .await?;

        match detail {
            Some(mut detail) => {
                detail.books = self.book_lines(&[detail.transaction.id]).await?;
                Ok(Some(detail))
            }
            None => Ok(None),
        }
    }

    pub async fn list_details(
        &self,
        program_id: i64,
        filter: &TransactionFilter,
    ) -> Result<Vec<TransactionDetail>, AppError> {
        let query = format!(
            r#"{}
            WHERE t.program_id = $1
              AND ($2::DATE IS NULL OR t.transaction_date >= $2)
              AND ($3::DATE IS NULL OR t.transaction_date <= $3)
              AND ($4::approval_status IS NULL OR t.status = $4)
              AND ($5::BIGINT IS NULL OR t.student_id = $5)
              AND ($6::BIGINT IS NULL OR t.leader_id = $6)
            ORDER BY t.transaction_date DESC, t.id DESC
            "#,
            DETAIL_SELECT
        );

        let mut details = sqlx::query_as::<_, TransactionDetail>(&query)
            .bind(program_id)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status)
            .bind(filter.student_id)
            .bind(filter.leader_id)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i64> = details.iter().map(|d| d.transaction.id).collect();
        let mut lines = self.book_lines(&ids).await?;

        // as linhas vêm ordenadas por transação; distribui sem outra consulta
        for detail in &mut details {
            let (mine, rest): (Vec<_>, Vec<_>) = lines
                .into_iter()
                .partition(|l| l.transaction_id == detail.transaction.id);
            detail.books = mine;
            lines = rest;
        }

        Ok(details)
    }

    pub async fn book_lines(&self, transaction_ids: &[i64]) -> Result<Vec<TransactionBookLine>, AppError> {
        if transaction_ids.is_empty() {
            return Ok(Vec::new());
        }

        let lines = sqlx::query_as::<_, TransactionBookLine>(
            r#"
            SELECT tb.id, tb.transaction_id, tb.book_id, b.title, tb.quantity, tb.price
            FROM transaction_books tb
            JOIN books b ON b.id = tb.book_id
            WHERE tb.transaction_id = ANY($1)
            ORDER BY tb.transaction_id, tb.id
            "#,
        )
        .bind(transaction_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    // ---
    // Agregados de vendas aprovadas (calculadora de comissão / adiantamentos)
    // ---

    pub async fn approved_sales<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        person_id: i64,
        person_type: PersonType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SaleRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SaleRow>(APPROVED_SALES)
            .bind(program_id)
            .bind(person_id)
            .bind(from)
            .bind(to)
            .bind(person_type)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Quantidade vendida por livro, com o preço de catálogo para classificar o tamanho.
    pub async fn approved_book_quantities<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        person_id: i64,
        person_type: PersonType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BookQuantityRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, BookQuantityRow>(APPROVED_BOOK_QUANTITIES)
            .bind(program_id)
            .bind(person_id)
            .bind(from)
            .bind(to)
            .bind(person_type)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    /// Soma das vendas aprovadas (snapshot do adiantamento semanal).
    pub async fn approved_total<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        person_id: i64,
        person_type: PersonType,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(APPROVED_TOTAL)
            .bind(program_id)
            .bind(person_id)
            .bind(from)
            .bind(to)
            .bind(person_type)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }
}
