// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::Actor,
};

// Valida o Bearer token e deixa o ator nas extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();
    let locale = Locale::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap_or_default();
    request = Request::from_parts(parts, body);

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;

    let actor = app_state
        .auth_service
        .validate_token(token)
        .map_err(|e| e.to_api_error(&locale))?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

// Extrator para obter o ator autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedActor(pub Actor);

impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(actor) => Ok(AuthenticatedActor(actor.clone())),
            None => {
                let locale = Locale::from_request_parts(parts, state).await.unwrap_or_default();
                Err(AppError::InvalidToken.to_api_error(&locale))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use axum::http::{Request as HttpRequest, StatusCode};

    #[tokio::test]
    async fn reads_the_actor_from_extensions() {
        let (mut parts, _) = HttpRequest::builder().uri("/").body(()).unwrap().into_parts();
        parts.extensions.insert(Actor { id: 3, role: Role::Leader, current_program_id: None });

        let AuthenticatedActor(actor) = AuthenticatedActor::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(actor.id, 3);
    }

    #[tokio::test]
    async fn missing_actor_is_unauthorized() {
        let (mut parts, _) = HttpRequest::builder()
            .uri("/")
            .header(header::ACCEPT_LANGUAGE, "es")
            .body(())
            .unwrap()
            .into_parts();

        let err = AuthenticatedActor::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error, "Token de autenticación inválido o ausente.");
    }
}
