//! carbon-tags API Server
//!
//! Run with: cargo run --bin carbon-tags [-- --config path/to/config.toml]
//!
//! # Configuration
//!
//! Settings come from a TOML file (`--config`, or the first of
//! `$XDG_CONFIG_HOME/carbon-tags/config.toml`, `/etc/carbon-tags/config.toml`,
//! `./config.toml`) with environment overrides:
//! - `CARBON_TAGS_HOST`: Host to bind to (default: 0.0.0.0)
//! - `CARBON_TAGS_PORT`: Port to listen on (default: 8080)
//! - `CARBON_TAGS_SEED_FILE`: Series paths loaded at start-up
//! - `CARBON_TAGS_LOG_LEVEL`: Log level (default: info)
//! - `CARBON_TAGS_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Takes precedence over the configured level

use carbon_tags::api::{serve, ApiConfig, AppState};
use carbon_tags::config::{Config, LoggingConfig};
use carbon_tags::index::SharedTagIndex;
use carbon_tags::query::QueryEvaluator;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "carbon-tags")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Graphite-compatible tag index server")]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting carbon-tags server v{}", env!("CARGO_PKG_VERSION"));

    let index = SharedTagIndex::new();
    if let Some(seed_file) = &config.index.seed_file {
        let stats = index.rebuild_from_file(Path::new(seed_file))?;
        tracing::info!(
            tags = stats.tags,
            values = stats.tag_values,
            metrics = stats.metrics,
            paths = stats.paths,
            "Seeded tag index"
        );
    }

    let api_config = ApiConfig::from_config(&config);
    let state = AppState::new(index, api_config.clone())
        .with_evaluator(QueryEvaluator::new(config.query.evaluator_config()));

    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("carbon-tags server stopped");
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("carbon_tags={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
