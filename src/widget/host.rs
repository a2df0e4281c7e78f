//! Chart host: catalog cache, the shared chart and per-viewer instances.

use std::sync::Arc;
use tokio::sync::{broadcast, OnceCell};

use super::poller::{PollerConfig, ResetSignal};
use super::LiveChart;
use crate::catalog::{wait_for_catalog, CatalogSource, CategoryCatalog, RetryPolicy};
use crate::catalog::FileCatalogSource;
use crate::chart::ChartConfig;
use crate::config::Config;
use crate::results::{HttpResultsClient, ResultsApi, ResultsError};

const RESET_CHANNEL_CAPACITY: usize = 32;

/// Owns everything chart instances on one host have in common
pub struct ChartHost {
    source: Arc<dyn CatalogSource>,
    retry: RetryPolicy,
    api: Arc<dyn ResultsApi>,
    chart_config: ChartConfig,
    poller: PollerConfig,
    reset: broadcast::Sender<ResetSignal>,
    catalog: OnceCell<CategoryCatalog>,
    chart: OnceCell<Arc<LiveChart>>,
}

impl ChartHost {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        api: Arc<dyn ResultsApi>,
        chart_config: ChartConfig,
        poller: PollerConfig,
    ) -> Self {
        let (reset, _) = broadcast::channel(RESET_CHANNEL_CAPACITY);
        Self {
            source,
            retry: RetryPolicy::default(),
            api,
            chart_config,
            poller,
            reset,
            catalog: OnceCell::new(),
            chart: OnceCell::new(),
        }
    }

    /// File catalog and HTTP results client, as configured
    pub fn from_config(config: &Config) -> Result<Self, ResultsError> {
        let api = HttpResultsClient::new(config.results.client_config())?;
        let source = FileCatalogSource::new(config.catalog.path.clone());

        Ok(Self::new(
            Arc::new(source),
            Arc::new(api),
            config.chart.clone(),
            config.poller.clone(),
        )
        .with_retry(config.catalog.retry_policy()))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn chart_config(&self) -> &ChartConfig {
        &self.chart_config
    }

    pub fn poller_config(&self) -> &PollerConfig {
        &self.poller
    }

    /// Catalog, waiting for it on first use. A failed wait is not cached.
    pub async fn catalog(&self) -> Option<&CategoryCatalog> {
        self.catalog
            .get_or_try_init(|| async {
                wait_for_catalog(self.source.as_ref(), self.retry)
                    .await
                    .ok_or(())
            })
            .await
            .ok()
    }

    pub fn is_ready(&self) -> bool {
        self.catalog.initialized()
    }

    /// The host's shared chart, created and started on the first call.
    ///
    /// Later calls return the same instance. Returns `None` when the
    /// catalog never became available; a later call tries again.
    pub async fn init_chart(&self) -> Option<Arc<LiveChart>> {
        self.chart
            .get_or_try_init(|| async {
                let chart = Arc::new(self.spawn_instance().await.ok_or(())?);
                if let Err(e) = chart.set_active(0).await {
                    tracing::warn!(error = %e, "Chart has no categories to show");
                    return Err(());
                }
                tracing::info!("Chart initialized");
                Ok(chart)
            })
            .await
            .ok()
            .cloned()
    }

    /// Shared chart if already initialized
    pub fn chart(&self) -> Option<Arc<LiveChart>> {
        self.chart.get().cloned()
    }

    /// A fresh, independent chart instance (own axis, data and poller).
    /// Polling starts with the first `set_active`.
    pub async fn spawn_instance(&self) -> Option<LiveChart> {
        let catalog = self.catalog().await?.clone();
        Some(
            LiveChart::new(
                catalog,
                self.chart_config.clone(),
                self.poller.clone(),
                self.api.clone(),
            )
            .with_reset_channel(self.reset.clone()),
        )
    }

    /// Tell every chart instance on this host to refetch now.
    /// Returns the number of listening poll loops.
    pub fn signal_reset(&self) -> usize {
        let listeners = self.reset.send(ResetSignal::now()).unwrap_or(0);
        tracing::info!(listeners, "Reset signal broadcast");
        listeners
    }

    pub fn reset_sender(&self) -> broadcast::Sender<ResetSignal> {
        self.reset.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, Category, StaticCatalogSource};
    use crate::results::{ResultsError, VoteCounts};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EmptyApi;

    #[async_trait]
    impl ResultsApi for EmptyApi {
        async fn fetch_results(&self, _number: u32) -> Result<VoteCounts, ResultsError> {
            Ok(VoteCounts::new())
        }
    }

    /// Publishes its catalog after a number of failed loads
    struct LateSource {
        ready_after: usize,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for LateSource {
        async fn load(&self) -> Result<Option<CategoryCatalog>, CatalogError> {
            let n = self.loads.fetch_add(1, Ordering::SeqCst);
            if n < self.ready_after {
                return Ok(None);
            }
            Ok(Some(catalog()))
        }

        fn describe(&self) -> String {
            "late".to_string()
        }
    }

    fn catalog() -> CategoryCatalog {
        CategoryCatalog::new(vec![
            Category::new(1, "Best Newcomer", ["Alice", "Bob"]),
            Category::new(2, "Best Film", ["Up"]),
        ])
        .unwrap()
    }

    fn host(source: Arc<dyn CatalogSource>) -> ChartHost {
        ChartHost::new(
            source,
            Arc::new(EmptyApi),
            ChartConfig::default(),
            PollerConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_from_config_reads_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(
            &path,
            r#"[{"number": 1, "title": "Best Newcomer", "nominees": ["Alice", "Bob"]}]"#,
        )
        .unwrap();

        let mut config = Config::default();
        config.catalog.path = path;
        let host = ChartHost::from_config(&config).unwrap();

        let catalog = host.catalog().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(host.poller_config(), &config.poller);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_chart_is_idempotent() {
        let host = host(Arc::new(StaticCatalogSource::new(catalog())));

        let first = host.init_chart().await.unwrap();
        let second = host.init_chart().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(host.is_ready());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(first.live_loops(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_chart_waits_for_catalog() {
        let source = Arc::new(LateSource {
            ready_after: 3,
            loads: AtomicUsize::new(0),
        });
        let host = host(source.clone());

        assert!(host.init_chart().await.is_some());
        assert_eq!(source.loads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_init_chart_gives_up_silently() {
        let host = host(Arc::new(StaticCatalogSource::new(CategoryCatalog::default())))
            .with_retry(RetryPolicy {
                max_attempts: 3,
                delay: Duration::from_millis(100),
            });

        assert!(host.init_chart().await.is_none());
        assert!(!host.is_ready());
        assert!(host.chart().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_are_independent() {
        let host = host(Arc::new(StaticCatalogSource::new(catalog())));
        let shared = host.init_chart().await.unwrap();
        let viewer = host.spawn_instance().await.unwrap();

        viewer.set_active(1).await.unwrap();
        assert_eq!(viewer.active().await, 1);
        assert_eq!(shared.active().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_reset_reaches_poll_loops() {
        let host = host(Arc::new(StaticCatalogSource::new(catalog())));
        let shared = host.init_chart().await.unwrap();
        let viewer = host.spawn_instance().await.unwrap();
        viewer.set_active(1).await.unwrap();

        assert_eq!(host.signal_reset(), 2);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(shared.stats().await.successes, 2);
    }
}
