//! API handlers — consistent envelope, typed responses, ISO-8601 timestamps.
//!
//! All handlers return `Response` via [`ApiResponse::ok`] or [`ApiErrorResponse`].

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::envelope::{ApiErrorResponse, ApiResponse};
use super::ApiState;
use crate::config::defaults;
use crate::pipeline::PipelineStats;
use crate::types::{FaultRecord, GridSnapshot, GridStatus, ManualCommand, TelemetryReading};

// ============================================================================
// Request / Response types
// ============================================================================

/// Body of `POST /api/v1/control`.
#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub action: String,
}

/// Acknowledgment that a manual command is waiting for the next cycle.
#[derive(Debug, Serialize)]
pub struct ControlAck {
    pub queued: &'static str,
}

/// Consolidated dashboard payload: live snapshot plus recent fault history.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub grid: GridSnapshot,
    pub recent_faults: Vec<FaultRecord>,
}

/// Service status for `GET /api/v1/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub substation_id: String,
    pub line_id: String,
    pub grid_status: GridStatus,
    pub classifier: &'static str,
    pub autonomous_trip: bool,
    pub fault_records: usize,
    pub pipeline: PipelineStats,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/v1/telemetry` — ingest one reading, return the breaker decision.
pub async fn ingest_telemetry(
    State(state): State<ApiState>,
    axum::Json(reading): axum::Json<TelemetryReading>,
) -> Response {
    match state.pipeline.process(&reading) {
        Ok(decision) => ApiResponse::ok(decision),
        Err(e) => ApiErrorResponse::unprocessable(e.to_string()),
    }
}

/// `POST /api/v1/control` — queue a manual TRIP or RESET.
///
/// Anything other than those two actions (case-insensitive) is a 400; there
/// is no lenient interpretation on the breaker path.
pub async fn queue_control(
    State(state): State<ApiState>,
    axum::Json(body): axum::Json<ControlRequest>,
) -> Response {
    match ManualCommand::parse(&body.action) {
        Some(command) => {
            state.pipeline.queue_manual(command);
            ApiResponse::ok(ControlAck {
                queued: command.as_str(),
            })
        }
        None => ApiErrorResponse::bad_request(format!(
            "unknown action `{}`: expected TRIP or RESET",
            body.action
        )),
    }
}

/// `GET /api/v1/dashboard` — live snapshot plus the most recent faults.
pub async fn dashboard(State(state): State<ApiState>) -> Response {
    let grid = state.pipeline.engine().snapshot();
    match state
        .pipeline
        .fault_log()
        .recent(defaults::DASHBOARD_FAULT_LIMIT)
    {
        Ok(recent_faults) => ApiResponse::ok(DashboardResponse {
            grid: (*grid).clone(),
            recent_faults,
        }),
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

/// `GET /api/v1/faults?limit=N` — fault history, newest first.
pub async fn list_faults(
    State(state): State<ApiState>,
    Query(query): Query<LimitQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(defaults::DASHBOARD_FAULT_LIMIT)
        .min(defaults::MAX_FAULT_QUERY_LIMIT);
    match state.pipeline.fault_log().recent(limit) {
        Ok(records) => ApiResponse::ok(records),
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

/// `POST /api/v1/faults/:id/resolve` — mark one fault record resolved.
pub async fn resolve_fault(State(state): State<ApiState>, Path(id): Path<u64>) -> Response {
    use crate::error::StorageError;
    match state.pipeline.fault_log().resolve(id) {
        Ok(record) => ApiResponse::ok(record),
        Err(StorageError::NotFound(_)) => {
            ApiErrorResponse::not_found(format!("fault record {id} not found"))
        }
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

/// `GET /api/v1/status` — service and pipeline status.
pub async fn service_status(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(StatusResponse {
        substation_id: state.config.substation.id.clone(),
        line_id: state.config.substation.line_id.clone(),
        grid_status: state.pipeline.engine().status(),
        classifier: state.pipeline.classifier_name(),
        autonomous_trip: state.config.policy.autonomous_trip,
        fault_records: state.pipeline.fault_log().count(),
        pipeline: state.pipeline.stats(),
    })
}

/// `GET /health` — legacy liveness probe, outside the envelope.
pub async fn health() -> Response {
    axum::Json(serde_json::json!({ "status": "ok" })).into_response()
}
