// src/handlers/geography.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::geo::{GeoNode, GeoPath},
    services::geography,
};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassifyParams {
    /// Raw kabupaten/city name as found in the source tables
    #[validate(length(min = 1, code = "required"))]
    #[serde(default)]
    pub name: String,
}

// GET /api/geo/hierarchy
#[utoipa::path(
    get,
    path = "/api/geo/hierarchy",
    tag = "Geography",
    responses(
        (status = 200, description = "Regional → kabupaten tree for the filter dropdowns", body = Vec<GeoNode>)
    )
)]
pub async fn get_hierarchy() -> impl IntoResponse {
    (StatusCode::OK, Json(geography::hierarchy()))
}

// GET /api/geo/classify?name=...
#[utoipa::path(
    get,
    path = "/api/geo/classify",
    tag = "Geography",
    params(ClassifyParams),
    responses(
        (status = 200, description = "Hierarchy path of the given kabupaten", body = GeoPath),
        (status = 400, description = "Missing name"),
        (status = 404, description = "Name not in the PUMA footprint")
    )
)]
pub async fn classify_location(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<ClassifyParams>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    params
        .validate()
        .map_err(|e| to_api(AppError::ValidationError(e)))?;

    let path = geography::classify(&params.name)
        .ok_or_else(|| to_api(AppError::LocationNotFound(params.name.clone())))?;

    Ok((StatusCode::OK, Json(path)))
}
