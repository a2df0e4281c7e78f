//! Awards Live CLI
//!
//! Command-line interface for Awards Live:
//! - Render a category to SVG offline
//! - Print grow-in animation frames
//! - Fetch or watch live results from the voting backend
//! - Inspect and drive a running chart host

use awards_live::catalog::CategoryCatalog;
use awards_live::chart::ChartConfig;
use awards_live::config::generate_default_config;
use awards_live::results::{
    HttpResultsClient, ResultsApi, ResultsClientConfig, ResultsPayload, VoteCounts,
};
use awards_live::widget::{ChartWidget, LiveChart, PollerConfig, RenderOptions, RenderedChart};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser)]
#[command(name = "awards-live-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live awards results charts from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Chart host URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Voting backend URL
    #[arg(long, default_value = "http://localhost:5000", global = true)]
    pub results_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one category to SVG
    Render {
        /// Category number (as in the catalog)
        category: u32,
        /// Catalog JSON file
        #[arg(short, long, default_value = "./categories.json")]
        catalog: PathBuf,
        /// Results JSON file (`{"results": [...]}`); fetched live when absent
        #[arg(short, long)]
        votes: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the grow-in animation frames for a category
    Frames {
        /// Category number
        category: u32,
        #[arg(short, long, default_value = "./categories.json")]
        catalog: PathBuf,
        /// Results JSON file; fetched live when absent
        #[arg(short, long)]
        votes: Option<PathBuf>,
        /// Spacing between frames
        #[arg(short, long, default_value = "100")]
        interval_ms: u64,
    },

    /// Fetch one results snapshot from the voting backend
    Fetch {
        /// Category number
        category: u32,
    },

    /// Poll the voting backend and print every redraw
    Watch {
        /// Category number
        category: u32,
        #[arg(short, long, default_value = "./categories.json")]
        catalog: PathBuf,
        /// Poll interval
        #[arg(short, long, default_value = "3000")]
        interval_ms: u64,
    },

    /// Show chart host status
    Status,

    /// List the host's category options
    Options,

    /// Select a category on the host's shared chart
    Select {
        /// 0-based option index
        index: usize,
    },

    /// Tell every chart on the host to refetch now
    Reset,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Render {
            category,
            catalog,
            votes,
            output,
        } => {
            let catalog = load_catalog(&catalog)?;
            let counts = load_votes(votes.as_deref(), &cli.results_url, category).await?;
            let chart = render_static(catalog, category, counts)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &chart.svg)?;
                    println!(
                        "Rendered category {} ({}) to {:?}",
                        chart.category_number, chart.title, path
                    );
                }
                None => println!("{}", chart.svg),
            }
        }

        Commands::Frames {
            category,
            catalog,
            votes,
            interval_ms,
        } => {
            let catalog = load_catalog(&catalog)?;
            let counts = load_votes(votes.as_deref(), &cli.results_url, category).await?;
            let index = index_of(&catalog, category)?;

            let mut widget = ChartWidget::new(catalog, ChartConfig::default());
            widget.update_vote_data(HashMap::from([(index, counts)]))?;
            widget.set_active(index)?;
            let chart = widget.render(index, RenderOptions::replay())?;

            let Some(plan) = chart.animation.as_ref() else {
                eprintln!("Nothing to animate");
                std::process::exit(1);
            };

            for frame in plan.frames(Duration::from_millis(interval_ms)) {
                if cli.format == "json" {
                    println!("{}", serde_json::to_string(&frame)?);
                } else {
                    let values = frame
                        .bars
                        .iter()
                        .map(|bar| format!("{:>6}", bar.value))
                        .collect::<String>();
                    println!("{:>6}ms  t={:.3} {}", frame.elapsed_ms, frame.t, values);
                }
            }
        }

        Commands::Fetch { category } => {
            let api = results_client(&cli.results_url)?;
            match api.fetch_results(category).await {
                Ok(counts) => {
                    if cli.format == "json" {
                        let payload = ResultsPayload {
                            results: counts.iter().collect(),
                        };
                        println!("{}", serde_json::to_string_pretty(&payload)?);
                    } else {
                        println!("{:<10} {}", "Nominee", "Votes");
                        println!("{}", "-".repeat(20));
                        for row in counts.iter() {
                            println!("{:<10} {}", row.nominee_id, row.votes);
                        }
                        println!();
                        println!("Total: {}", counts.total());
                    }
                }
                Err(e) => {
                    eprintln!("Cannot fetch results from {}", cli.results_url);
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Watch {
            category,
            catalog,
            interval_ms,
        } => {
            let catalog = load_catalog(&catalog)?;
            let index = index_of(&catalog, category)?;
            let api: Arc<dyn ResultsApi> = Arc::new(results_client(&cli.results_url)?);

            let chart = LiveChart::new(
                catalog,
                ChartConfig::default(),
                PollerConfig { interval_ms },
                api,
            )
            .with_error_hook(Arc::new(|e: &awards_live::results::ResultsError| {
                eprintln!("Poll failed: {}", e);
            }));

            let mut renders = chart.subscribe();
            chart.set_active(index).await?;

            loop {
                tokio::select! {
                    render = renders.recv() => match render {
                        Ok(rendered) => print_chart(&rendered, &cli.format)?,
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            chart.stop().await;
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Awards Live v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "Host Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Catalog:     {}",
                        health["catalog"].as_str().unwrap_or("unknown")
                    );
                    println!("Viewers:     {}", health["viewers"].as_u64().unwrap_or(0));

                    if let Some(poll) = health.get("poll") {
                        println!();
                        println!("Polling:");
                        println!("  Successes:       {}", poll["successes"].as_u64().unwrap_or(0));
                        println!("  Failures:        {}", poll["failures"].as_u64().unwrap_or(0));
                        println!(
                            "  Skipped hidden:  {}",
                            poll["skipped_hidden"].as_u64().unwrap_or(0)
                        );
                        println!(
                            "  Discarded stale: {}",
                            poll["discarded_stale"].as_u64().unwrap_or(0)
                        );
                        if let Some(error) = poll["last_error"].as_str() {
                            println!("  Last error:      {}", error);
                        }
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("Host returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Awards Live at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the chart host is running:");
                    eprintln!("  cargo run --bin awards-live");
                    std::process::exit(1);
                }
            }
        }

        Commands::Options => {
            let response = client
                .get(format!("{}/api/v1/categories", cli.api_url))
                .send()
                .await?;

            if !response.status().is_success() {
                eprintln!("Failed to fetch categories: {}", response.status());
                std::process::exit(1);
            }

            let data: serde_json::Value = response.json().await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                let active = data["active"].as_u64().unwrap_or(0);
                println!("{:<3} {:<7} {:<8} {}", "", "Index", "Number", "Title");
                println!("{}", "-".repeat(50));
                for option in data["options"].as_array().into_iter().flatten() {
                    let index = option["index"].as_u64().unwrap_or(0);
                    println!(
                        "{:<3} {:<7} {:<8} {}",
                        if index == active { "*" } else { "" },
                        index,
                        option["number"].as_u64().unwrap_or(0),
                        option["label"].as_str().unwrap_or("-")
                    );
                }
            }
        }

        Commands::Select { index } => {
            let response = client
                .post(format!("{}/api/v1/chart/active", cli.api_url))
                .json(&serde_json::json!({ "index": index }))
                .send()
                .await?;

            if response.status().is_success() {
                let chart: serde_json::Value = response.json().await?;
                println!(
                    "Selected category {}: {}",
                    chart["category_number"].as_u64().unwrap_or(0),
                    chart["title"].as_str().unwrap_or("-")
                );
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Failed ({}): {}", status, text);
                std::process::exit(1);
            }
        }

        Commands::Reset => {
            let response = client
                .post(format!("{}/api/v1/signals/reset", cli.api_url))
                .send()
                .await?;

            if response.status().is_success() {
                let data: serde_json::Value = response.json().await?;
                println!(
                    "Reset signal sent: {} poll loops, {} viewers",
                    data["listeners"].as_u64().unwrap_or(0),
                    data["viewers"].as_u64().unwrap_or(0)
                );
            } else {
                eprintln!("Reset failed: {}", response.status());
                std::process::exit(1);
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &config)?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", config);
            }
        }
    }

    Ok(())
}

fn results_client(base_url: &str) -> Result<HttpResultsClient, Box<dyn std::error::Error>> {
    Ok(HttpResultsClient::new(ResultsClientConfig {
        base_url: base_url.to_string(),
        request_timeout_ms: 5000,
    })?)
}

fn load_catalog(path: &Path) -> Result<CategoryCatalog, Box<dyn std::error::Error>> {
    if !path.exists() {
        eprintln!("Catalog not found: {:?}", path);
        std::process::exit(1);
    }
    Ok(CategoryCatalog::from_json(&std::fs::read_to_string(path)?)?)
}

/// Votes from a results file, or a live fetch when no file is given
async fn load_votes(
    path: Option<&Path>,
    results_url: &str,
    category: u32,
) -> Result<VoteCounts, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let payload: ResultsPayload = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            Ok(payload.results.into_iter().collect())
        }
        None => Ok(results_client(results_url)?.fetch_results(category).await?),
    }
}

fn index_of(catalog: &CategoryCatalog, category: u32) -> Result<usize, Box<dyn std::error::Error>> {
    catalog
        .index_of_number(category)
        .ok_or_else(|| format!("No category number {} in catalog", category).into())
}

fn render_static(
    catalog: CategoryCatalog,
    category: u32,
    counts: VoteCounts,
) -> Result<RenderedChart, Box<dyn std::error::Error>> {
    let index = index_of(&catalog, category)?;
    let mut widget = ChartWidget::new(catalog, ChartConfig::default());
    widget.set_active(index)?;
    Ok(widget.update_vote_data(HashMap::from([(index, counts)]))?)
}

fn print_chart(chart: &RenderedChart, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if format == "json" {
        println!("{}", serde_json::to_string(chart)?);
        return Ok(());
    }

    println!();
    println!(
        "{} (axis {}){}",
        chart.title,
        chart.axis_max,
        if chart.is_animated() { " *" } else { "" }
    );
    for point in &chart.points {
        println!(
            "  {:<24} {:>6} {}",
            point.name,
            point.value,
            bar(point.value, chart.axis_max, 40)
        );
    }
    Ok(())
}

fn bar(value: u64, axis_max: u64, width: usize) -> String {
    if axis_max == 0 {
        return String::new();
    }
    let filled = ((value.min(axis_max) as f64 / axis_max as f64) * width as f64).round() as usize;
    "#".repeat(filled)
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
