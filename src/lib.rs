//! # Awards Live
//!
//! Live voting results for awards events. A chart host polls the voting
//! backend for per-category results and renders each category as an SVG
//! bar chart whose y-axis only ever grows.
//!
//! ## Features
//!
//! - **Polling**: fixed-interval results fetches that pause while the page
//!   is hidden and never let a stale response overwrite the chart
//! - **Ratcheting axis**: the axis maximum grows in fixed steps and is
//!   shared by every category on a chart instance
//! - **Grow-in animation**: each category animates once, on its first
//!   render with data; later updates redraw statically
//! - **Selector**: one category list exposed as a dropdown, a pill row and
//!   a bottom sheet, with touch-scroll suppression for the sheet
//! - **Live view**: WebSocket sessions, one chart instance per viewer, plus
//!   a host-wide reset signal
//!
//! ## Modules
//!
//! - [`catalog`]: Category catalog and its loaders
//! - [`results`]: Results wire types and the HTTP client
//! - [`chart`]: Axis scaler, layout, labels, animation and SVG output
//! - [`selector`]: Category options and the scroll guard
//! - [`widget`]: Chart instances, the poller and the host
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Live-view sessions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use awards_live::catalog::{Category, CategoryCatalog};
//! use awards_live::chart::ChartConfig;
//! use awards_live::results::{ResultRow, VoteCounts};
//! use awards_live::widget::ChartWidget;
//! use std::collections::HashMap;
//!
//! let catalog = CategoryCatalog::new(vec![
//!     Category::new(1, "Best Newcomer", ["Alice", "Bob", "Carol"]),
//! ])?;
//! let mut widget = ChartWidget::new(catalog, ChartConfig::default());
//!
//! let counts: VoteCounts = [ResultRow::new(1, 12), ResultRow::new(3, 7)]
//!     .into_iter()
//!     .collect();
//! let chart = widget.update_vote_data(HashMap::from([(0, counts)]))?;
//!
//! assert_eq!(chart.axis_max, 50);
//! std::fs::write("chart.svg", &chart.svg)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod logging;
pub mod results;
pub mod selector;
pub mod websocket;
pub mod widget;

// Re-export top-level types for convenience
pub use catalog::{
    wait_for_catalog, CatalogSource, Category, CategoryCatalog, FileCatalogSource, RetryPolicy,
    StaticCatalogSource,
};

pub use results::{HttpResultsClient, ResultRow, ResultsApi, ResultsError, VoteCounts};

pub use chart::{AxisScaler, ChartConfig, ChartDataPoint, Tooltip};

pub use selector::{Affordance, CategoryOption, CategorySelector, ScrollGuard};

pub use widget::{
    ChartHost, ChartWidget, LiveChart, PollStats, PollerConfig, RenderOptions, RenderedChart,
    WidgetError,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::Config;
