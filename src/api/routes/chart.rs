//! Chart Routes
//!
//! Drive the host's shared chart.
//!
//! - GET /api/v1/chart - Latest render metadata
//! - GET /api/v1/chart/svg - Latest render as SVG
//! - POST /api/v1/chart/active - Select a category
//! - POST /api/v1/chart/render - Redraw, optionally replaying the grow-in
//! - POST /api/v1/chart/poll - Restart polling for a category
//! - POST /api/v1/chart/votes - Replace vote data in bulk
//! - POST /api/v1/chart/hover - Tooltip at a pointer position

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dto::{
    ChartResponse, HoverRequest, PollRequest, PollResponse, RenderRequest, SelectRequest,
    VotesRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chart::Tooltip;
use crate::results::VoteCounts;
use crate::widget::RenderOptions;

/// GET /api/v1/chart
pub async fn get_chart(State(state): State<Arc<AppState>>) -> ApiResult<Json<ChartResponse>> {
    let chart = state.chart()?;
    let latest = chart
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No chart rendered yet".to_string()))?;

    Ok(Json(ChartResponse::from(latest.as_ref())))
}

/// GET /api/v1/chart/svg
pub async fn get_chart_svg(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let chart = state.chart()?;
    let latest = chart
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No chart rendered yet".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        latest.svg.clone(),
    ))
}

/// POST /api/v1/chart/active
pub async fn set_active(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<ChartResponse>> {
    let chart = state.chart()?;
    let rendered = chart.set_active(request.index).await?;
    Ok(Json(ChartResponse::from(rendered.as_ref())))
}

/// POST /api/v1/chart/render
pub async fn render(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> ApiResult<Json<ChartResponse>> {
    let chart = state.chart()?;
    let options = RenderOptions {
        animate_replay: request.animate_replay,
    };
    let rendered = chart.render(request.index, options).await?;
    Ok(Json(ChartResponse::from(rendered.as_ref())))
}

/// POST /api/v1/chart/poll
pub async fn start_polling(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PollRequest>,
) -> ApiResult<(StatusCode, Json<PollResponse>)> {
    let chart = state.chart()?;
    chart.start_polling(request.index).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(PollResponse {
            index: request.index,
            polling: chart.is_polling().await,
            interval_ms: state.host.poller_config().interval_ms,
        }),
    ))
}

/// POST /api/v1/chart/votes
///
/// Keys are category numbers; every one must exist in the catalog.
pub async fn update_votes(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VotesRequest>,
) -> ApiResult<Json<ChartResponse>> {
    let chart = state.chart()?;
    let catalog = chart.catalog().await;

    let mut snapshot = HashMap::with_capacity(request.categories.len());
    for (number, rows) in request.categories {
        let index = catalog
            .index_of_number(number)
            .ok_or_else(|| ApiError::NotFound(format!("Category number {}", number)))?;
        snapshot.insert(index, rows.into_iter().collect::<VoteCounts>());
    }

    let rendered = chart.update_vote_data(snapshot).await?;
    Ok(Json(ChartResponse::from(rendered.as_ref())))
}

/// POST /api/v1/chart/hover
pub async fn hover(
    State(state): State<Arc<AppState>>,
    Json(request): Json<HoverRequest>,
) -> ApiResult<Json<Option<Tooltip>>> {
    if !request.x.is_finite() || !request.y.is_finite() {
        return Err(ApiError::Validation(
            "Pointer coordinates must be finite".to_string(),
        ));
    }

    let chart = state.chart()?;
    Ok(Json(chart.hit_test(request.x, request.y).await))
}
