//! REST API module using Axum
//!
//! HTTP surface for field devices and operator tooling:
//! - `POST /api/v1/telemetry` — reading in, breaker decision out (bearer-gated)
//! - `POST /api/v1/control` — queue a manual TRIP/RESET (bearer-gated)
//! - `GET /api/v1/dashboard` — live snapshot plus recent faults
//! - `GET /api/v1/faults`, `POST /api/v1/faults/:id/resolve`
//! - `GET /api/v1/status`, `GET /health`

pub mod auth;
pub mod envelope;
pub mod handlers;
mod routes;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::{AuthConfig, GridConfig};
use crate::pipeline::IngestionPipeline;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<IngestionPipeline>,
    pub config: Arc<GridConfig>,
    pub auth: AuthConfig,
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `GRIDWARDEN_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development against an external dashboard.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("GRIDWARDEN_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
        Err(_) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    }
}

/// Create the complete application router.
pub fn create_app(pipeline: Arc<IngestionPipeline>, config: Arc<GridConfig>) -> Router {
    if config.auth.is_open() {
        warn!("No API tokens configured: all mutating endpoints are OPEN");
    }

    let state = ApiState {
        pipeline,
        auth: config.auth.clone(),
        config,
    };

    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .merge(routes::legacy_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}
