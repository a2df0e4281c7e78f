//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

use super::error::{ApiError, ApiResult};
use crate::config::Config;
use crate::websocket::{ConnectionHub, HubConfig, ServerMessage};
use crate::widget::{ChartHost, LiveChart};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog cache, shared chart and per-viewer instance factory
    pub host: Arc<ChartHost>,
    /// Full service configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Live-view connections
    pub ws_hub: Arc<ConnectionHub>,
}

/// What a reset signal reached
#[derive(Debug, Clone, Copy)]
pub struct ResetOutcome {
    pub issued_at: DateTime<Utc>,
    pub listeners: usize,
    pub viewers: usize,
}

impl AppState {
    pub fn new(host: Arc<ChartHost>, config: Config) -> Self {
        let hub_config = HubConfig {
            max_connections: config.api.max_connections,
        };
        Self {
            host,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// The shared chart, or 503 while the catalog is still missing
    pub fn chart(&self) -> ApiResult<Arc<LiveChart>> {
        self.host
            .chart()
            .ok_or_else(|| ApiError::ServiceUnavailable("Chart not initialized".to_string()))
    }

    /// Make every chart on the host refetch and tell every viewer
    pub async fn signal_reset(&self) -> ResetOutcome {
        let issued_at = Utc::now();
        let listeners = self.host.signal_reset();
        let viewers = self
            .ws_hub
            .broadcast(&ServerMessage::Reset { issued_at })
            .await;

        ResetOutcome {
            issued_at,
            listeners,
            viewers,
        }
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
