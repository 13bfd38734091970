//! Bearer-token gate for mutating endpoints.
//!
//! Telemetry ingestion, breaker control, and fault resolution all change
//! state and require a configured token — field devices and operator tooling
//! share the same token list. Read-only endpoints are not gated.
//!
//! An empty token list is open dev mode: the gate passes everything and a
//! warning is logged once at startup (see `create_app`).

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use super::envelope::ApiErrorResponse;
use super::ApiState;

/// Axum middleware enforcing `Authorization: Bearer <token>` on the route
/// it wraps. No-op when no tokens are configured.
pub async fn require_token(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    if state.auth.is_open() {
        return next.run(request).await;
    }

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if state.auth.accepts(token) => next.run(request).await,
        Some(_) => ApiErrorResponse::unauthorized("invalid token"),
        None => ApiErrorResponse::unauthorized("missing bearer token"),
    }
}
