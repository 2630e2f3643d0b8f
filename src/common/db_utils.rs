// src/common/db_utils.rs

use crate::common::error::AppError;

/// Violações dos índices únicos parciais viram `Conflict`; o resto segue como erro de banco.
/// É a segunda linha de defesa quando duas requisições passam juntas pela checagem prévia.
pub(crate) fn conflict_on_unique(e: sqlx::Error, reason: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            tracing::warn!(
                constraint = db_err.constraint().unwrap_or_default(),
                "Violação de unicidade: {}",
                reason
            );
            return AppError::Conflict(reason.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_errors_pass_through() {
        let err = conflict_on_unique(sqlx::Error::RowNotFound, "duplicado");
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
