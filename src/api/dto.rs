//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::chart::ChartDataPoint;
use crate::results::ResultRow;
use crate::selector::{CategoryOption, SelectorView};
use crate::widget::{PollStats, RenderedChart};

// ============================================
// CHART DTOs
// ============================================

/// Selector contents for every affordance
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub active: usize,
    pub options: Vec<CategoryOption>,
    pub views: Vec<SelectorView>,
}

/// Metadata of a render; the SVG itself is served separately
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub index: usize,
    pub category_number: u32,
    pub title: String,
    pub points: Vec<ChartDataPoint>,
    pub axis_max: u64,
    pub animated: bool,
    /// Grow-in duration, when this render animates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_ms: Option<u64>,
    pub rendered_at: DateTime<Utc>,
}

impl From<&RenderedChart> for ChartResponse {
    fn from(chart: &RenderedChart) -> Self {
        Self {
            index: chart.index,
            category_number: chart.category_number,
            title: chart.title.clone(),
            points: chart.points.clone(),
            axis_max: chart.axis_max,
            animated: chart.is_animated(),
            animation_ms: chart.animation.as_ref().map(|plan| plan.duration_ms),
            rendered_at: chart.rendered_at,
        }
    }
}

/// Select a category
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

/// Redraw a category
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub index: usize,
    /// Replay the grow-in even if already shown
    #[serde(default)]
    pub animate_replay: bool,
}

/// Start polling a category
#[derive(Debug, Deserialize)]
pub struct PollRequest {
    pub index: usize,
}

/// Poll loop state after a poll request
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub index: usize,
    pub polling: bool,
    pub interval_ms: u64,
}

/// Bulk vote snapshot keyed by category number (as in the catalog)
#[derive(Debug, Deserialize)]
pub struct VotesRequest {
    pub categories: HashMap<u32, Vec<ResultRow>>,
}

/// Pointer position in chart canvas coordinates
#[derive(Debug, Deserialize)]
pub struct HoverRequest {
    pub x: f64,
    pub y: f64,
}

// ============================================
// SIGNAL DTOs
// ============================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub issued_at: DateTime<Utc>,
    /// Poll loops that received the signal
    pub listeners: usize,
    /// Live-view connections notified
    pub viewers: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", or "unhealthy"
    pub status: String,
    /// Catalog status: "ok" or "waiting"
    pub catalog: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Service version
    pub version: String,
    /// Open live-view connections
    pub viewers: usize,
    /// Shared chart poll counters, once the chart exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollStats>,
}
