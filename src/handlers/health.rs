// src/handlers/health.rs

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// GET /api/health/db
#[utoipa::path(
    get,
    path = "/api/health/db",
    tag = "Health",
    responses(
        (status = 200, description = "Reporting database reachable"),
        (status = 503, description = "Reporting database unavailable")
    )
)]
pub async fn database_health(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let ping = tokio::time::timeout(
        Duration::from_secs(3),
        sqlx::query("SELECT 1").execute(&app_state.db_pool),
    )
    .await
    .unwrap_or(Err(sqlx::Error::PoolTimedOut));

    ping.map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}
