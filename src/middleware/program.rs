// src/middleware/program.rs

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
    models::auth::Actor,
};

// Cabeçalho que escolhe explicitamente o programa da operação
pub const PROGRAM_ID_HEADER: &str = "x-program-id";

/// Programa em que a operação acontece.
/// Ordem: cabeçalho `x-program-id`, depois o programa corrente do ator.
/// O id resolvido é passado explicitamente para todos os serviços.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramScope(pub i64);

fn resolve(parts: &Parts) -> Result<ProgramScope, AppError> {
    if let Some(value) = parts.headers.get(PROGRAM_ID_HEADER) {
        let program_id = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::InvalidInput(format!("cabeçalho {} inválido", PROGRAM_ID_HEADER))
            })?;
        return Ok(ProgramScope(program_id));
    }

    parts
        .extensions
        .get::<Actor>()
        .and_then(|actor| actor.current_program_id)
        .map(ProgramScope)
        .ok_or(AppError::MissingProgramScope)
}

impl<S> FromRequestParts<S> for ProgramScope
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match resolve(parts) {
            Ok(scope) => Ok(scope),
            Err(e) => {
                let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
                Err(e.to_api_error(&locale))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use axum::http::{Request, StatusCode};

    fn parts(header: Option<&str>, current_program: Option<i64>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(PROGRAM_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(Actor {
            id: 1,
            role: Role::Admin,
            current_program_id: current_program,
        });
        parts
    }

    #[tokio::test]
    async fn header_wins_over_the_actor_program() {
        let mut p = parts(Some("9"), Some(4));
        assert_eq!(ProgramScope::from_request_parts(&mut p, &()).await.unwrap(), ProgramScope(9));
    }

    #[tokio::test]
    async fn falls_back_to_the_actor_program() {
        let mut p = parts(None, Some(4));
        assert_eq!(ProgramScope::from_request_parts(&mut p, &()).await.unwrap(), ProgramScope(4));
    }

    #[tokio::test]
    async fn missing_program_is_a_bad_request() {
        let mut p = parts(None, None);
        let err = ProgramScope::from_request_parts(&mut p, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() {
        for raw in ["abc", "0", "-3"] {
            let mut p = parts(Some(raw), Some(4));
            let err = ProgramScope::from_request_parts(&mut p, &()).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }
}
