// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Unknown report: {0}")]
    ReportNotFound(String),

    #[error("Unknown location: {0}")]
    LocationNotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Error already rendered for a client: status plus a localized message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<BTreeMap<String, Vec<String>>>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ReportNotFound(_) | AppError::LocationNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(sqlx::Error::PoolTimedOut) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::ReportNotFound(_) => "report_not_found",
            AppError::LocationNotFound(_) => "location_not_found",
            AppError::DatabaseError(sqlx::Error::PoolTimedOut) => "database_unavailable",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status();
        if status.is_server_error() {
            // Details stay in the log, never in the response.
            tracing::error!(error = %self, "request failed");
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| store.translate(lang, &e.code))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(details)
            }
            _ => None,
        };

        ApiError {
            status,
            message: store.translate(lang, self.message_key()),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(AppError::ReportNotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn localizes_validation_details() {
        let mut errors = ValidationErrors::new();
        errors.add("date", ValidationError::new("invalid_date"));

        let api = AppError::ValidationError(errors).to_api_error(&Locale("id".into()), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Satu atau lebih parameter tidak valid.");
        let details = api.details.expect("details");
        assert_eq!(details["date"], vec!["Tanggal harus berformat YYYY-MM-DD.".to_string()]);
    }

    #[test]
    fn hides_internal_error_text() {
        let api = AppError::InternalServerError(anyhow::anyhow!("secret dsn"))
            .to_api_error(&Locale("en".into()), &I18nStore::new());
        assert_eq!(api.message, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }

    #[tokio::test]
    async fn api_error_renders_localized_json() {
        let response = AppError::LocationNotFound("BANDUNG".into())
            .to_api_error(&Locale("id".into()), &I18nStore::new())
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Lokasi tidak termasuk wilayah PUMA." }));
    }
}
