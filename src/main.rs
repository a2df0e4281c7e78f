//! Awards Live Host
//!
//! Run with: cargo run --bin awards-live -- --config config.toml
//!
//! # Configuration
//!
//! Config file search order (first found wins) when `--config` is absent:
//! `$XDG_CONFIG_HOME/awards-live/config.toml`, `/etc/awards-live/config.toml`,
//! `./config.toml`. Environment variables override file values:
//! - `AWARDS_API_HOST`, `AWARDS_API_PORT`: bind address
//! - `AWARDS_RESULTS_BASE_URL`: voting backend base URL
//! - `AWARDS_CATALOG_PATH`: category catalog JSON
//! - `AWARDS_POLL_INTERVAL_MS`: results poll interval
//! - `AWARDS_LOG_LEVEL`, `AWARDS_LOG_FORMAT`: logging
//! - `RUST_LOG`: overrides the log filter entirely

use anyhow::Context;
use awards_live::api::{serve, AppState};
use awards_live::config::Config;
use awards_live::logging;
use awards_live::widget::ChartHost;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "awards-live")]
#[command(about = "Live awards results chart host", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::resolve(args.config.as_deref()).context("Failed to load config")?;
    logging::init(&config.logging);

    tracing::info!("Starting Awards Live v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Results backend: {}", config.results.base_url);
    tracing::info!("Catalog: {:?}", config.catalog.path);

    let host = Arc::new(ChartHost::from_config(&config).context("Failed to build results client")?);

    // The catalog may be published after startup; serve health probes meanwhile
    let init_host = Arc::clone(&host);
    tokio::spawn(async move {
        if init_host.init_chart().await.is_none() {
            tracing::warn!("Catalog never became available; chart stays uninitialized");
        }
    });

    let api_config = config.api.clone();
    serve(AppState::new(host, config), &api_config).await?;

    tracing::info!("Awards Live stopped");
    Ok(())
}
