// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PUMA KPI Dashboard API",
        description = "Revenue and transaction roll-ups by regional, branch, subbranch, cluster and kabupaten."
    ),
    paths(
        // --- Health ---
        handlers::health::database_health,

        // --- Reports ---
        handlers::reports::list_reports,
        handlers::reports::get_report,

        // --- Geography ---
        handlers::geography::get_hierarchy,
        handlers::geography::classify_location,
    ),
    components(
        schemas(
            // --- Reports ---
            models::report::ReportKind,
            models::report::MetricUnit,
            models::report::ReportSummary,
            models::report::Metrics,
            models::report::RollupNode,
            models::report::FlatRollupRow,
            models::report::ReportData,
            models::report::ReportFilters,
            models::report::ReportResponse,

            // --- Period ---
            models::period::DateRange,
            models::period::PeriodWindow,

            // --- Geography ---
            models::geo::GeoLevel,
            models::geo::GeoNode,
            models::geo::GeoPath,
        )
    ),
    tags(
        (name = "Reports", description = "Multi-period KPI reports"),
        (name = "Geography", description = "PUMA geographic hierarchy"),
        (name = "Health", description = "Service probes")
    )
)]
pub struct ApiDoc;
