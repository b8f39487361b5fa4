use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mulewatch::util::print_analysis_summary;
use mulewatch::{read_transfers, DetectionConfig, MulingDetectionEngine};

/// Flag money-muling accounts and rings in a transfer ledger
#[derive(Parser, Debug)]
#[command(name = "mulewatch", version, about)]
struct Cli {
    /// CSV with transaction_id, sender_id, receiver_id, amount, timestamp
    transactions: PathBuf,

    /// TOML file overriding detection thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Also write JSON logs to daily files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_tracing(log_dir: Option<&PathBuf>) -> Result<()> {
    // Console layer on stderr so stdout stays clean for JSON
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "mulewatch.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            // Keep the writer alive for the whole process
            std::mem::forget(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking_file)
                    .json()
                    .with_current_span(false)
                    .with_span_list(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    Ok(())
}

#[instrument(skip_all)]
fn load_config(path: Option<&PathBuf>) -> Result<DetectionConfig> {
    match path {
        Some(path) => {
            let config = DetectionConfig::load_from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            info!("⚙️ Loaded detection config from {}", path.display());
            Ok(config)
        }
        None => Ok(DetectionConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_dir.as_ref())?;

    info!("🕵️ mulewatch - money-muling detection");

    let config = load_config(cli.config.as_ref())?;
    let ingest = read_transfers(&cli.transactions)
        .with_context(|| format!("reading transfers from {}", cli.transactions.display()))?;
    if ingest.transfers.is_empty() {
        warn!("No usable transfers in {}", cli.transactions.display());
    }

    let engine = MulingDetectionEngine::new(config);
    let thresholds = engine.config();
    debug!(
        "Thresholds: cycles {}..={}, velocity {} in {}h, fan {}, shell below {:.2}",
        thresholds.cycles.min_length,
        thresholds.cycles.max_length,
        thresholds.velocity.min_transactions,
        thresholds.velocity.window_hours,
        thresholds.fan.degree_threshold,
        thresholds.shell.low_value_threshold
    );
    let result = engine.analyze(&ingest.transfers);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("💾 Result written to {}", path.display());
        }
        None => println!("{}", json),
    }

    print_analysis_summary(&result);
    Ok(())
}
