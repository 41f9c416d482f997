// src/routes.rs

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::cors::build_cors_layer};

pub fn router(app_state: AppState) -> Router {
    let report_routes = Router::new()
        .route("/", get(handlers::reports::list_reports))
        .route("/{kind}", get(handlers::reports::get_report));

    let geo_routes = Router::new()
        .route("/hierarchy", get(handlers::geography::get_hierarchy))
        .route("/classify", get(handlers::geography::classify_location));

    let cors = build_cors_layer(&app_state.settings);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/health/db", get(handlers::health::database_health))
        .nest("/api/reports", report_routes)
        .nest("/api/geo", geo_routes)
        // Short aliases used by the dashboard pages, e.g. /api/revenue-sa
        .route("/api/{kind}", get(handlers::reports::get_report))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
