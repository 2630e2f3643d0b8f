// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

/// Idiomas com mensagens traduzidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Es,
    Pt,
}

// Extrator de idioma (primeira tag do Accept-Language, sem a região)
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

impl Locale {
    pub fn lang(&self) -> Lang {
        match self.0.as_str() {
            "es" => Lang::Es,
            "pt" => Lang::Pt,
            _ => Lang::En,
        }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let lang = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    // "pt-BR" -> "pt"
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            });

        Ok(lang.map(Locale).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Locale {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(header::ACCEPT_LANGUAGE, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Locale::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn picks_the_preferred_language() {
        assert_eq!(extract(Some("pt-BR,pt;q=0.9,en;q=0.8")).await.lang(), Lang::Pt);
        assert_eq!(extract(Some("es-MX")).await.lang(), Lang::Es);
        assert_eq!(extract(Some("en-US")).await.lang(), Lang::En);
    }

    #[tokio::test]
    async fn defaults_to_english() {
        assert_eq!(extract(None).await.lang(), Lang::En);
        assert_eq!(extract(Some("fr-FR")).await.lang(), Lang::En);
    }
}
