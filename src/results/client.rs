//! Results API Client
//!
//! HTTP client for the voting backend's per-category results endpoint.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

use super::{ResultsError, ResultsPayload, VoteCounts};

/// Source of per-category results snapshots
#[async_trait]
pub trait ResultsApi: Send + Sync {
    /// Fetch the full snapshot for a category by its 1-based number
    async fn fetch_results(&self, category_number: u32) -> Result<VoteCounts, ResultsError>;
}

/// Configuration for the HTTP results client
#[derive(Debug, Clone)]
pub struct ResultsClientConfig {
    /// Backend base URL (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ResultsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

/// Results client backed by reqwest.
///
/// Keeps a cookie store so session cookies issued by the backend are sent
/// back on every poll.
pub struct HttpResultsClient {
    client: Client,
    config: ResultsClientConfig,
}

impl HttpResultsClient {
    pub fn new(config: ResultsClientConfig) -> Result<Self, ResultsError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .cookie_store(true)
            .build()
            .map_err(|e| ResultsError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ResultsClientConfig {
        &self.config
    }

    /// Results URL for a category, without the cache-busting parameter
    pub fn results_url(&self, category_number: u32) -> String {
        format!(
            "{}/api/categories/{}/results",
            self.config.base_url.trim_end_matches('/'),
            category_number
        )
    }
}

/// Cache-busting value sent as `t`
fn cache_bust() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
impl ResultsApi for HttpResultsClient {
    async fn fetch_results(&self, category_number: u32) -> Result<VoteCounts, ResultsError> {
        let url = self.results_url(category_number);

        let response = self
            .client
            .get(&url)
            .query(&[("t", cache_bust())])
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(ResultsError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ResultsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(ResultsError::from_transport)?;

        let payload: ResultsPayload =
            serde_json::from_slice(&body).map_err(|e| ResultsError::Decode(e.to_string()))?;

        Ok(VoteCounts::from(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        routing::get,
        Json, Router,
    };
    use std::collections::HashMap;

    async fn results_handler(
        Path(id): Path<u32>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Result<Json<serde_json::Value>, StatusCode> {
        if !params.contains_key("t") {
            return Err(StatusCode::BAD_REQUEST);
        }

        match id {
            1 => Ok(Json(serde_json::json!({
                "results": [
                    {"nominee_id": 1, "votes": 12},
                    {"nominee_id": 3, "votes": 7}
                ]
            }))),
            2 => Ok(Json(serde_json::json!({"results": "nope"}))),
            _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    async fn spawn_backend() -> String {
        let app = Router::new().route("/api/categories/:id/results", get(results_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> HttpResultsClient {
        HttpResultsClient::new(ResultsClientConfig {
            base_url,
            request_timeout_ms: 2000,
        })
        .unwrap()
    }

    #[test]
    fn test_results_url_trims_trailing_slash() {
        let client = client_for("http://votes.example/".to_string());
        assert_eq!(
            client.results_url(4),
            "http://votes.example/api/categories/4/results"
        );
    }

    #[tokio::test]
    async fn test_fetch_results() {
        let client = client_for(spawn_backend().await);

        let counts = client.fetch_results(1).await.unwrap();
        assert_eq!(counts.get(1), 12);
        assert_eq!(counts.get(2), 0);
        assert_eq!(counts.get(3), 7);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let client = client_for(spawn_backend().await);

        let err = client.fetch_results(9).await.unwrap_err();
        assert!(matches!(err, ResultsError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let client = client_for(spawn_backend().await);

        let err = client.fetch_results(2).await.unwrap_err();
        assert!(matches!(err, ResultsError::Decode(_)));
    }
}
