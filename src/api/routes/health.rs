//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (catalog loaded, chart running)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 503 until the catalog has loaded and the shared chart exists.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.host.is_ready() && state.host.chart().is_some() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let catalog_ok = state.host.is_ready();
    let chart = state.host.chart();

    let poll = match &chart {
        Some(chart) => Some(chart.stats().await),
        None => None,
    };
    let results_ok = poll
        .as_ref()
        .map(|stats| stats.last_error.is_none() || stats.successes > 0)
        .unwrap_or(false);

    let status = match (catalog_ok, results_ok) {
        (true, true) => "healthy",
        (true, false) => "degraded",
        (false, _) => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        catalog: if catalog_ok { "ok" } else { "waiting" }.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        viewers: state.ws_connection_count().await,
        poll,
    })
}
