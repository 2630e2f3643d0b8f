// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Supervisor,
    Leader,
    Viewer,
}

// Estrutura de dados ("claims") dentro do JWT.
// O token é emitido pelo serviço de autenticação; aqui só validamos.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: i64,       // Subject (ID do usuário)
    pub role: Role,
    pub program_id: Option<i64>, // Programa corrente do usuário
    pub exp: usize,
    pub iat: usize,
}

/// O ator autenticado que acompanha todas as operações do motor.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub role: Role,
    pub current_program_id: Option<i64>,
}

impl From<Claims> for Actor {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            current_program_id: claims.program_id,
        }
    }
}
