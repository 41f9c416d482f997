// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::report::{ReportKind, ReportParams, ReportResponse, ReportSummary},
    services::period,
};

// GET /api/reports
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "Reports",
    responses(
        (status = 200, description = "Available KPI reports", body = Vec<ReportSummary>)
    )
)]
pub async fn list_reports(State(app_state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(app_state.report_service.catalog()))
}

// GET /api/reports/{kind} (also mounted as /api/{kind})
#[utoipa::path(
    get,
    path = "/api/reports/{kind}",
    tag = "Reports",
    params(
        ("kind" = String, Path, description = "Report slug, e.g. revenue-sa or trx-sa-byu"),
        ReportParams
    ),
    responses(
        (status = 200, description = "Target, MTD, M-1, Y-1 and YTD roll-up by geography", body = ReportResponse),
        (status = 400, description = "Invalid date or geographic filter"),
        (status = 404, description = "Unknown report")
    )
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(kind): Path<String>,
    Query(params): Query<ReportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let kind = ReportKind::from_slug(&kind).ok_or_else(|| to_api(AppError::ReportNotFound(kind.clone())))?;

    // Field-level validation first, then the cross-field rules
    params
        .validate()
        .map_err(|e| to_api(AppError::ValidationError(e)))?;

    let offset = app_state.settings.business_utc_offset_hours;
    let now = Utc::now();
    params
        .validate_consistency(period::business_today(now, offset))
        .map_err(|e| to_api(AppError::ValidationError(e)))?;

    let reference_date = params
        .reference_date()
        .unwrap_or_else(|| period::default_reference_date(now, offset));

    let report = app_state
        .report_service
        .build(kind, reference_date, params.filters(), params.view())
        .await
        .map_err(to_api)?;

    Ok((StatusCode::OK, Json(report)))
}
