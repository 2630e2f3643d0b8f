// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Actor, Claims},
};

// Os tokens são emitidos por outro serviço com o mesmo segredo HS256.
// Aqui só conferimos assinatura e expiração e montamos o ator.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Actor, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token recusado: {}", e);
                AppError::InvalidToken
            })?;

        Ok(Actor::from(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            role: Role::Supervisor,
            program_id: Some(7),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn valid_token_becomes_an_actor() {
        let service = AuthService::new("segredo");
        let actor = service.validate_token(&token("segredo", 3600)).unwrap();
        assert_eq!(actor.id, 42);
        assert_eq!(actor.role, Role::Supervisor);
        assert_eq!(actor.current_program_id, Some(7));
    }

    #[test]
    fn wrong_secret_or_expired_token_is_rejected() {
        let service = AuthService::new("segredo");
        assert!(matches!(
            service.validate_token(&token("outro", 3600)),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            service.validate_token(&token("segredo", -3600)),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(service.validate_token("lixo"), Err(AppError::InvalidToken)));
    }
}
