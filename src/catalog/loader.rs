//! Catalog Loading
//!
//! The catalog may not exist yet when the chart starts (it is published by
//! the event organisers alongside the page). Sources report "not yet
//! available" as `Ok(None)` and [`wait_for_catalog`] retries on a fixed
//! delay up to a bounded number of attempts.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{CatalogError, CategoryCatalog};

/// Somewhere a catalog can be loaded from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the catalog. `Ok(None)` means it is not available yet.
    async fn load(&self) -> Result<Option<CategoryCatalog>, CatalogError>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Catalog read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn load(&self) -> Result<Option<CategoryCatalog>, CatalogError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CatalogError::Io {
                    path: self.path.clone(),
                    error: e.to_string(),
                })
            }
        };

        let catalog = CategoryCatalog::from_json(&content)?;
        if catalog.is_empty() {
            return Ok(None);
        }

        Ok(Some(catalog))
    }

    fn describe(&self) -> String {
        format!("file {:?}", self.path)
    }
}

/// Catalog that is already in memory
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    catalog: CategoryCatalog,
}

impl StaticCatalogSource {
    pub fn new(catalog: CategoryCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn load(&self) -> Result<Option<CategoryCatalog>, CatalogError> {
        if self.catalog.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.catalog.clone()))
        }
    }

    fn describe(&self) -> String {
        format!("in-memory catalog ({} categories)", self.catalog.len())
    }
}

/// Bounded retry schedule for catalog loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            delay: Duration::from_millis(100),
        }
    }
}

/// Wait for a catalog to become available.
///
/// Load errors count as "not available yet" (a file may be mid-write).
/// Returns `None` once the attempts are exhausted.
pub async fn wait_for_catalog(
    source: &dyn CatalogSource,
    policy: RetryPolicy,
) -> Option<CategoryCatalog> {
    let attempts = policy.max_attempts.max(1);

    for attempt in 1..=attempts {
        match source.load().await {
            Ok(Some(catalog)) => {
                tracing::info!(
                    source = %source.describe(),
                    categories = catalog.len(),
                    attempt,
                    "Catalog loaded"
                );
                return Some(catalog);
            }
            Ok(None) => {
                tracing::debug!(source = %source.describe(), attempt, "Catalog not available yet");
            }
            Err(e) => {
                tracing::debug!(source = %source.describe(), attempt, error = %e, "Catalog load failed");
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    tracing::warn!(
        source = %source.describe(),
        attempts,
        "Catalog unavailable, giving up"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::tempdir;

    /// Becomes available after a number of loads
    struct LateSource {
        calls: AtomicU32,
        ready_after: u32,
    }

    #[async_trait]
    impl CatalogSource for LateSource {
        async fn load(&self) -> Result<Option<CategoryCatalog>, CatalogError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call >= self.ready_after {
                Ok(Some(
                    CategoryCatalog::new(vec![Category::new(1, "Best Song", ["A"])]).unwrap(),
                ))
            } else {
                Ok(None)
            }
        }

        fn describe(&self) -> String {
            "late".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_available() {
        let source = LateSource {
            calls: AtomicU32::new(0),
            ready_after: 4,
        };

        let catalog = wait_for_catalog(&source, RetryPolicy::default()).await;

        assert!(catalog.is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let source = LateSource {
            calls: AtomicU32::new(0),
            ready_after: u32::MAX,
        };
        let policy = RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_millis(100),
        };

        let catalog = wait_for_catalog(&source, policy).await;

        assert!(catalog.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_not_ready() {
        let dir = tempdir().unwrap();
        let source = FileCatalogSource::new(dir.path().join("categories.json"));

        assert!(source.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_source_reads_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(
            &path,
            r#"[{"number": 1, "title": "Best Newcomer", "nominees": ["Alice", "Bob"]}]"#,
        )
        .unwrap();

        let catalog = FileCatalogSource::new(&path).load().await.unwrap().unwrap();
        assert_eq!(catalog.get(0).unwrap().title, "Best Newcomer");
    }

    #[tokio::test]
    async fn test_file_source_empty_catalog_is_not_ready() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("categories.json");
        std::fs::write(&path, "[]").unwrap();

        assert!(FileCatalogSource::new(&path).load().await.unwrap().is_none());
    }
}
