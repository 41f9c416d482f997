// src/middleware/cors.rs

use axum::http::{
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE},
    Method,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Settings;

// The dashboard frontend only reads.
pub fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE]);

    if settings.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins = settings
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect::<Vec<_>>();
    layer.allow_origin(origins)
}
