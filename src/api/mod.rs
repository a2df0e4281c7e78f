//! Awards Live REST API
//!
//! HTTP surface of the chart host, built with Axum.
//!
//! # Endpoints
//!
//! ## Categories
//! - `GET /api/v1/categories` - Selector options and affordance views
//!
//! ## Chart
//! - `GET /api/v1/chart` - Latest render metadata
//! - `GET /api/v1/chart/svg` - Latest render as SVG
//! - `POST /api/v1/chart/active` - Select a category
//! - `POST /api/v1/chart/render` - Redraw a category
//! - `POST /api/v1/chart/poll` - Restart polling for a category
//! - `POST /api/v1/chart/votes` - Replace vote data in bulk
//! - `POST /api/v1/chart/hover` - Tooltip at a pointer position
//!
//! ## Signals
//! - `POST /api/v1/signals/reset` - Votes were reset, refetch everywhere
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /api/v1/ws` - Live view, one chart instance per connection
//!
//! # Example
//!
//! ```rust,no_run
//! use awards_live::api::{serve, AppState};
//! use awards_live::config::Config;
//! use awards_live::widget::ChartHost;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load_default();
//! let host = Arc::new(ChartHost::from_config(&config)?);
//! let api = config.api.clone();
//! serve(AppState::new(host, config), &api).await?;
//! # Ok(())
//! # }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, ResetOutcome};

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/categories", get(routes::categories::list_categories))
        // Chart routes
        .route("/chart", get(routes::chart::get_chart))
        .route("/chart/svg", get(routes::chart::get_chart_svg))
        .route("/chart/active", post(routes::chart::set_active))
        .route("/chart/render", post(routes::chart::render))
        .route("/chart/poll", post(routes::chart::start_polling))
        .route("/chart/votes", post(routes::chart::update_votes))
        .route("/chart/hover", post(routes::chart::hover))
        // Signal routes
        .route("/signals/reset", post(routes::signals::signal_reset))
        // WebSocket route
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.api.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// No configured origins means any origin (the widget is embedded on
/// arbitrary pages).
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Awards Live API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Awards Live API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    use super::AppState;
    use crate::catalog::{Category, CategoryCatalog, RetryPolicy, StaticCatalogSource};
    use crate::chart::ChartConfig;
    use crate::config::Config;
    use crate::results::{ResultRow, ResultsApi, ResultsError, VoteCounts};
    use crate::widget::{ChartHost, PollerConfig};

    pub struct FixedResults;

    #[async_trait]
    impl ResultsApi for FixedResults {
        async fn fetch_results(&self, _category_number: u32) -> Result<VoteCounts, ResultsError> {
            Ok([ResultRow::new(1, 12), ResultRow::new(3, 7)]
                .into_iter()
                .collect())
        }
    }

    pub fn catalog() -> CategoryCatalog {
        CategoryCatalog::new(vec![
            Category::new(1, "Best Newcomer", ["Alice", "Bob", "Carol"]),
            Category::new(2, "Best Film", ["Up", "Down"]),
        ])
        .unwrap()
    }

    fn host(catalog: CategoryCatalog) -> Arc<ChartHost> {
        Arc::new(
            ChartHost::new(
                Arc::new(StaticCatalogSource::new(catalog)),
                Arc::new(FixedResults),
                ChartConfig::default(),
                PollerConfig::default(),
            )
            .with_retry(RetryPolicy {
                max_attempts: 1,
                delay: Duration::from_millis(1),
            }),
        )
    }

    /// State with the shared chart initialized on category 0
    pub async fn test_state() -> Arc<AppState> {
        let host = host(catalog());
        host.init_chart().await.unwrap();
        Arc::new(AppState::new(host, Config::default()))
    }

    /// State whose catalog never shows up
    pub fn waiting_state() -> AppState {
        AppState::new(host(CategoryCatalog::default()), Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{test_state, waiting_state};
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt;

    async fn create_test_app() -> Router {
        let state = test_state().await;
        build_router(AppState::clone(&state))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, json: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app().await;
        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app().await;
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_ready_without_catalog() {
        let app = build_router(waiting_state());
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app().await;
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["catalog"], "ok");
        assert_eq!(body["viewers"], 0);
    }

    #[tokio::test]
    async fn test_list_categories() {
        let app = create_test_app().await;
        let response = app.oneshot(get("/api/v1/categories")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["active"], 0);
        assert_eq!(body["options"][1]["label"], "Best Film");
        assert_eq!(body["views"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_chart_unavailable_before_init() {
        let app = build_router(waiting_state());
        let response = app.oneshot(get("/api/v1/chart")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chart_svg() {
        let app = create_test_app().await;
        let response = app.oneshot(get("/api/v1/chart/svg")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/svg+xml"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).starts_with("<svg"));
    }

    #[tokio::test]
    async fn test_set_active() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post("/api/v1/chart/active", r#"{"index": 1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["index"], 1);
        assert_eq!(body["category_number"], 2);
        assert_eq!(body["points"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_active_unknown_index() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post("/api/v1/chart/active", r#"{"index": 9}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_render_replay_animates() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post(
                "/api/v1/chart/render",
                r#"{"index": 0, "animate_replay": true}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["animated"], true);
        assert!(body["animation_ms"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_start_polling() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post("/api/v1/chart/poll", r#"{"index": 1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = body_json(response).await;
        assert_eq!(body["polling"], true);
        assert_eq!(body["interval_ms"], 3000);
    }

    #[tokio::test]
    async fn test_update_votes() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post(
                "/api/v1/chart/votes",
                r#"{"categories": {"1": [{"nominee_id": 2, "votes": 64}]}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["animated"], false);
        assert_eq!(body["points"][1]["value"], 64);
        assert!(body["axis_max"].as_u64().unwrap() >= 64);
    }

    #[tokio::test]
    async fn test_update_votes_unknown_category() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post(
                "/api/v1/chart/votes",
                r#"{"categories": {"99": []}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hover() {
        let app = create_test_app().await;
        let response = app
            .clone()
            .oneshot(post("/api/v1/chart/hover", r#"{"x": 100.0, "y": 300.0}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "Alice");

        let response = app
            .oneshot(post("/api/v1/chart/hover", r#"{"x": 1.0, "y": 1.0}"#))
            .await
            .unwrap();
        assert!(body_json(response).await.is_null());
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post("/api/v1/chart/active", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_signal_reset_reaches_shared_chart() {
        let app = create_test_app().await;
        let response = app
            .oneshot(post("/api/v1/signals/reset", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["listeners"], 1);
        assert_eq!(body["viewers"], 0);
    }
}
