// src/db/person_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::person::{Person, PersonType},
};

#[derive(Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pessoa de um programa. Pessoas de outros programas não são visíveis.
    pub async fn find_in_program<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        person_id: i64,
    ) -> Result<Option<Person>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, program_id, first_name, last_name, email, person_type, status
            FROM people
            WHERE id = $1 AND program_id = $2
            "#,
        )
        .bind(person_id)
        .bind(program_id)
        .fetch_optional(executor)
        .await?;
        Ok(person)
    }

    /// Igual a `find_in_program`, mas exige o tipo.
    pub async fn find_typed<'e, E>(
        &self,
        executor: E,
        program_id: i64,
        person_id: i64,
        person_type: PersonType,
    ) -> Result<Option<Person>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, program_id, first_name, last_name, email, person_type, status
            FROM people
            WHERE id = $1 AND program_id = $2 AND person_type = $3
            "#,
        )
        .bind(person_id)
        .bind(program_id)
        .bind(person_type)
        .fetch_optional(executor)
        .await?;
        Ok(person)
    }

    pub async fn list_active_colporters(&self, program_id: i64) -> Result<Vec<Person>, AppError> {
        let people = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, program_id, first_name, last_name, email, person_type, status
            FROM people
            WHERE program_id = $1 AND person_type = 'COLPORTER' AND status = 'ACTIVE'
            ORDER BY first_name, last_name, id
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(people)
    }

    /// Todos os cadastros ativos de colportor com o mesmo e-mail nos programas informados.
    pub async fn matching_colporter_ids(
        &self,
        email: &str,
        program_ids: &[i64],
    ) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM people
            WHERE email = $1
              AND person_type = 'COLPORTER'
              AND status = 'ACTIVE'
              AND program_id = ANY($2)
            ORDER BY id
            "#,
        )
        .bind(email)
        .bind(program_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
