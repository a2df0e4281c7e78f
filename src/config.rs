//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::RetryPolicy;
use crate::chart::ChartConfig;
use crate::results::ResultsClientConfig;
use crate::selector::ScrollGuardConfig;
use crate::widget::PollerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub results: ResultsConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub selector: ScrollGuardConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Host server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Live-view WebSocket limit
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_connections() -> usize {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Voting backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsConfig {
    #[serde(default = "default_results_url")]
    pub base_url: String,

    #[serde(default = "default_results_timeout")]
    pub request_timeout_ms: u64,
}

fn default_results_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_results_timeout() -> u64 {
    5000
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            base_url: default_results_url(),
            request_timeout_ms: default_results_timeout(),
        }
    }
}

impl ResultsConfig {
    pub fn client_config(&self) -> ResultsClientConfig {
        ResultsClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Category catalog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./categories.json")
}

fn default_retry_attempts() -> u32 {
    50
}

fn default_retry_delay() -> u64 {
    100
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl CatalogConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, or the first default location that
    /// exists, or the environment alone.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("awards-live").join("config.toml")),
            Some(PathBuf::from("/etc/awards-live/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `AWARDS_*` overrides from a variable lookup
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("AWARDS_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("AWARDS_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(url) = lookup("AWARDS_RESULTS_BASE_URL") {
            self.results.base_url = url;
        }

        if let Some(path) = lookup("AWARDS_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(path);
        }

        if let Some(ms) = lookup("AWARDS_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.poller.interval_ms = ms;
        }

        if let Some(level) = lookup("AWARDS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AWARDS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Awards Live Configuration
#
# Environment variables override these settings:
# - AWARDS_API_HOST
# - AWARDS_API_PORT
# - AWARDS_RESULTS_BASE_URL
# - AWARDS_CATALOG_PATH
# - AWARDS_POLL_INTERVAL_MS
# - AWARDS_LOG_LEVEL
# - AWARDS_LOG_FORMAT

[api]
# Host server bind address
host = "0.0.0.0"
port = 8090

# Allowed CORS origins (empty = any)
cors_origins = []

# Maximum concurrent live-view connections
max_connections = 500

[results]
# Voting backend serving /api/categories/{n}/results
base_url = "http://localhost:5000"

# Per-request timeout (ms)
request_timeout_ms = 5000

[chart]
# Axis baseline and rounding step
min_max = 50
step = 10

[chart.layout]
width = 800.0
height = 420.0
band_padding = 0.2
min_bar_width = 6.0
ticks = 5
label_split = 12

[chart.animation]
# Grow-in duration (ms) and per-bar start offset (fraction of duration)
duration_ms = 900
stagger = 0.06

[poller]
# How often the active category is refreshed (ms)
interval_ms = 3000

[selector]
# Bottom-sheet touch handling
scroll_threshold_px = 8.0
quiet_period_ms = 1000

[catalog]
# JSON list of categories and nominees
path = "./categories.json"

# How long to wait for the catalog to appear
retry_attempts = 50
retry_delay_ms = 100

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.poller.interval_ms, 3000);
        assert_eq!(config.chart.min_max, 50);
        assert_eq!(config.catalog.retry_policy(), RetryPolicy::default());
        assert_eq!(config.selector.quiet_period_ms, 1000);
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.api.bind_addr(), defaults.api.bind_addr());
        assert_eq!(config.results.base_url, defaults.results.base_url);
        assert_eq!(config.chart, defaults.chart);
        assert_eq!(config.poller, defaults.poller);
        assert_eq!(config.selector, defaults.selector);
    }

    #[test]
    fn test_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[poller]\ninterval_ms = 1500\n\n[chart]\nstep = 25").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.poller.interval_ms, 1500);
        assert_eq!(config.chart.step, 25);
        assert_eq!(config.chart.min_max, 50);
        assert_eq!(config.api.port, 8090);
    }

    #[test]
    fn test_partial_margin_table() {
        let config = Config::parse("[chart.layout.margin]\nleft = 60.0").unwrap();
        let margin = config.chart.layout.margin;
        assert_eq!(margin.left, 60.0);
        assert_eq!(margin.top, 24.0);
        assert_eq!(margin.bottom, 64.0);
        assert_eq!(config.chart.layout.width, 800.0);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/awards.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("AWARDS_API_PORT", "9000"),
            ("AWARDS_RESULTS_BASE_URL", "http://votes.internal"),
            ("AWARDS_POLL_INTERVAL_MS", "not-a-number"),
            ("AWARDS_LOG_FORMAT", "json"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.results.base_url, "http://votes.internal");
        assert_eq!(config.poller.interval_ms, 3000);
        assert_eq!(config.logging.format, "json");
    }
}
