use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crc_weekly::{DashboardConfig, Output, Pipeline, Refresher, Transformer};

#[derive(Parser, Debug)]
#[command(name = "crc-weekly")]
#[command(about = "Publishes the weekly cluster utilization dashboard")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CRC_WEEKLY_CONFIG")]
    config: Option<PathBuf>,

    /// Write the dashboard to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Refresh interval in seconds (overrides the configuration)
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    if let Some(secs) = args.refresh {
        config.refresh_secs = secs;
    }
    if args.output.is_some() {
        config.output = args.output;
    }

    let transformer = Transformer::new(config.transform_config()?);
    let fetcher = config.build_fetcher()?;
    let output = match &config.output {
        Some(path) => Output::file(path),
        None => Output::stdout(),
    };

    let refresher = Refresher::builder(Pipeline::new(fetcher, transformer))
        .output(output)
        .interval(config.refresh_interval()?)
        .build();

    if args.once {
        let previous = refresher.restore().await;
        let dashboard = refresher
            .run_once(previous.as_ref())
            .await
            .context("Refresh cycle failed")?;
        if !dashboard.errors.is_empty() {
            warn!(failed = ?dashboard.errors.keys().collect::<Vec<_>>(), "some panels failed");
        }
        return Ok(());
    }

    run_until_interrupted(refresher).await
}

async fn run_until_interrupted(refresher: Refresher) -> Result<()> {
    info!(interval = ?refresher.interval(), "refreshing until interrupted");
    let handle = refresher.start();
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutting down");
    handle.stop().await;
    Ok(())
}

/// Logs go to stderr; stdout may carry the dashboard itself.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
