// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

const SUPPORTED: &[&str] = &["en", "id"];

// Language of the response messages, from Accept-Language.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_header(value: Option<&str>) -> Self {
        // "id-ID" -> "id"; the first supported base language wins
        let lang = value
            .map(accept_language::parse)
            .and_then(|tags| {
                tags.iter()
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
                    .find(|base| SUPPORTED.contains(&base.as_str()))
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
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
        let header_value = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(header_value))
    }
}
