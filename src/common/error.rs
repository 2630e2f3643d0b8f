// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    middleware::i18n::{Lang, Locale},
    models::{expense::BudgetInfo, program::ProgramIdsError},
    settlement::transitions::TransitionError,
};

// Erro de domínio. Os serviços só conhecem este tipo; a tradução para HTTP
// acontece em `to_api_error`, já com o idioma da requisição.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(&'static str),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Orçamento da categoria '{}' excedido", .0.category)]
    BudgetExceeded(BudgetInfo),

    #[error("Adiantamento de {requested} acima do limite de {limit}")]
    AdvanceLimitExceeded { requested: Decimal, limit: Decimal },

    #[error("Token inválido")]
    InvalidToken,

    #[error("Nenhum programa selecionado")]
    MissingProgramScope,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        AppError::Conflict(e.to_string())
    }
}

impl From<ProgramIdsError> for AppError {
    fn from(e: ProgramIdsError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

/// Resposta de erro pronta para o cliente: `{ "error": ..., "details": ... }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---
// Mensagens localizadas (en / es / pt)
// ---

#[derive(Debug, Clone, Copy)]
enum MessageKey {
    Validation,
    InvalidInput,
    NotFound,
    Conflict,
    BudgetExceeded,
    AdvanceLimit,
    InvalidToken,
    MissingProgram,
    Internal,
}

fn translate(key: MessageKey, lang: Lang) -> &'static str {
    use Lang::*;
    use MessageKey::*;

    match (key, lang) {
        (Validation, En) => "One or more fields are invalid.",
        (Validation, Es) => "Uno o más campos no son válidos.",
        (Validation, Pt) => "Um ou mais campos são inválidos.",

        (InvalidInput, En) => "The request is invalid.",
        (InvalidInput, Es) => "La solicitud no es válida.",
        (InvalidInput, Pt) => "A requisição é inválida.",

        (NotFound, En) => "Resource not found.",
        (NotFound, Es) => "Recurso no encontrado.",
        (NotFound, Pt) => "Recurso não encontrado.",

        (Conflict, En) => "The operation conflicts with the current state of the resource.",
        (Conflict, Es) => "La operación entra en conflicto con el estado actual del recurso.",
        (Conflict, Pt) => "A operação conflita com o estado atual do recurso.",

        (BudgetExceeded, En) => "The expense exceeds the category budget.",
        (BudgetExceeded, Es) => "El gasto supera el presupuesto de la categoría.",
        (BudgetExceeded, Pt) => "A despesa excede o orçamento da categoria.",

        (AdvanceLimit, En) => "The cash advance exceeds the allowed limit.",
        (AdvanceLimit, Es) => "El adelanto supera el límite permitido.",
        (AdvanceLimit, Pt) => "O adiantamento excede o limite permitido.",

        (InvalidToken, En) => "Invalid or missing authentication token.",
        (InvalidToken, Es) => "Token de autenticación inválido o ausente.",
        (InvalidToken, Pt) => "Token de autenticação inválido ou ausente.",

        (MissingProgram, En) => "No program selected. Send the x-program-id header.",
        (MissingProgram, Es) => "Ningún programa seleccionado. Envíe el encabezado x-program-id.",
        (MissingProgram, Pt) => "Nenhum programa selecionado. Envie o cabeçalho x-program-id.",

        (Internal, En) => "An unexpected error occurred.",
        (Internal, Es) => "Ocurrió un error inesperado.",
        (Internal, Pt) => "Ocorreu um erro inesperado.",
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidInput(_)
            | AppError::MissingProgramScope => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BudgetExceeded(_) | AppError::AdvanceLimitExceeded { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message_key(&self) -> MessageKey {
        match self {
            AppError::ValidationError(_) => MessageKey::Validation,
            AppError::InvalidInput(_) => MessageKey::InvalidInput,
            AppError::ResourceNotFound(_) => MessageKey::NotFound,
            AppError::Conflict(_) => MessageKey::Conflict,
            AppError::BudgetExceeded(_) => MessageKey::BudgetExceeded,
            AppError::AdvanceLimitExceeded { .. } => MessageKey::AdvanceLimit,
            AppError::InvalidToken => MessageKey::InvalidToken,
            AppError::MissingProgramScope => MessageKey::MissingProgram,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => MessageKey::Internal,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut fields = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            AppError::InvalidInput(reason) | AppError::Conflict(reason) => {
                Some(json!({ "reason": reason }))
            }
            AppError::ResourceNotFound(resource) => Some(json!({ "resource": resource })),
            AppError::BudgetExceeded(info) => Some(json!({ "budgetInfo": info })),
            AppError::AdvanceLimitExceeded { requested, limit } => {
                Some(json!({ "requestedAmount": requested, "limit": limit }))
            }
            // Erros internos nunca expõem detalhes
            _ => None,
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    /// Erros internos são logados aqui, dentro do span do handler.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("🔥 Erro interno: {}", self);
        }

        ApiError {
            status,
            error: translate(self.message_key(), locale.lang()).to_string(),
            details: self.details(),
        }
    }
}

// Usado quando não há `Locale` à mão (ex.: dentro do middleware de auth)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ResourceNotFound("transaction").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MissingProgramScope.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn budget_error_carries_budget_info() {
        let err = AppError::BudgetExceeded(BudgetInfo {
            category: "incentivos".into(),
            budget: Decimal::new(1000, 0),
            current_spending: Decimal::new(900, 0),
            remaining: Decimal::new(100, 0),
            requested_amount: Decimal::new(250, 0),
        });

        let api = err.to_api_error(&Locale("en".into()));
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.error, "The expense exceeds the category budget.");

        let details = api.details.unwrap();
        assert_eq!(details["budgetInfo"]["category"], "incentivos");
        assert!(details["budgetInfo"].get("requestedAmount").is_some());
        assert!(details["budgetInfo"].get("currentSpending").is_some());
    }

    #[test]
    fn messages_follow_the_locale() {
        let err = AppError::Conflict("já aprovada".into());
        assert_eq!(
            err.to_api_error(&Locale("pt".into())).error,
            "A operação conflita com o estado atual do recurso."
        );
        assert_eq!(
            err.to_api_error(&Locale("es".into())).error,
            "La operación entra en conflicto con el estado actual del recurso."
        );
        // idioma desconhecido cai no inglês
        assert_eq!(
            err.to_api_error(&Locale("de".into())).error,
            "The operation conflicts with the current state of the resource."
        );
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123"))
            .to_api_error(&Locale::default());
        assert!(api.details.is_none());
        assert!(!api.error.contains("123"));
    }

    #[test]
    fn transition_errors_become_conflicts() {
        let err: AppError = TransitionError::AlreadyRejected.into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "required"))]
        category: String,
    }

    #[test]
    fn validation_details_list_fields() {
        let errors = Sample { category: String::new() }.validate().unwrap_err();
        let api = AppError::from(errors).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["category"][0], "required");
    }
}
