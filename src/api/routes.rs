//! v1 API route table.

use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;

use super::{auth, handlers, ApiState};

/// Build the v1 API router.
///
/// Every mutating endpoint (telemetry ingestion, control, fault resolution)
/// sits behind the bearer gate; read-only endpoints do not.
pub fn api_routes(state: ApiState) -> Router {
    let gated = Router::new()
        .route("/telemetry", post(handlers::ingest_telemetry))
        .route("/control", post(handlers::queue_control))
        .route("/faults/:id/resolve", post(handlers::resolve_fault))
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/faults", get(handlers::list_faults))
        .route("/status", get(handlers::service_status))
        .merge(gated)
        .with_state(state)
}

/// Legacy unversioned routes kept for probe compatibility.
pub fn legacy_routes() -> Router {
    Router::new().route("/health", get(handlers::health))
}
