//! Signal Routes
//!
//! - POST /api/v1/signals/reset - Votes were reset; every chart refetches now

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ResetResponse;
use crate::api::state::AppState;

/// POST /api/v1/signals/reset
pub async fn signal_reset(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    let outcome = state.signal_reset().await;

    Json(ResetResponse {
        issued_at: outcome.issued_at,
        listeners: outcome.listeners,
        viewers: outcome.viewers,
    })
}
