//! Category Routes
//!
//! - GET /api/v1/categories - Selector options and affordance views

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::OptionsResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<OptionsResponse>> {
    let chart = state.chart()?;

    Ok(Json(OptionsResponse {
        active: chart.active().await,
        options: chart.build_options().await,
        views: chart.selector_views().await,
    }))
}
