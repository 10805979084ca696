//! CLI entry point for the Rome in Transit feed pipeline.
//!
//! Provides subcommands for a single poll, a fixed-period polling loop that
//! feeds the map display, and inspection of individual feed payloads.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rome_in_transit::{
    config::PipelineConfig,
    extract::Extractor,
    fetch::{BasicClient, fetch_bytes},
    output::{append_record, print_json, print_pretty, write_snapshot},
    parser::{FeedKind, decode},
    pipeline::{Pipeline, Snapshot},
    projection::Projector,
    summary::FleetSummary,
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "rome_in_transit")]
#[command(about = "Live vehicle positions and delays from GTFS-RT feeds", long_about = None)]
struct Cli {
    /// JSON config file; defaults apply to any missing key
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll both feeds once
    Poll {
        /// Write the snapshot (records + update time) to this JSON file
        #[arg(long)]
        json_out: Option<String>,

        /// CSV file to append the fleet summary to
        #[arg(long)]
        csv: Option<String>,
    },
    /// Poll on a fixed period, refreshing the snapshot every tick
    Watch {
        /// Seconds between polls (overrides the config file)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of polls to run (0 = until Ctrl+C)
        #[arg(short = 'n', long, default_value_t = 0)]
        num_samples: usize,

        /// Write the snapshot to this JSON file on every tick
        #[arg(long)]
        json_out: Option<String>,

        /// CSV file to append one fleet summary row per tick
        #[arg(long)]
        csv: Option<String>,
    },
    /// Decode a feed from a file or URL and log the extracted records
    Inspect {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Which feed the payload belongs to
        #[arg(short, long, value_enum, default_value_t = FeedKind::VehiclePositions)]
        kind: FeedKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/rome_in_transit.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("rome_in_transit.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    }
    .with_env();

    match cli.command {
        Commands::Poll { json_out, csv } => {
            let resolved = config.resolve()?;
            let pipeline = Pipeline::from_config(&resolved)?;

            let snapshot = pipeline.tick().await;
            report(&snapshot, json_out.as_deref(), csv.as_deref())?;
        }
        Commands::Watch {
            interval,
            num_samples,
            json_out,
            csv,
        } => {
            let mut resolved = config.resolve()?;
            if let Some(secs) = interval {
                anyhow::ensure!(secs > 0, "--interval must be at least 1 second");
                resolved.poll_interval = Duration::from_secs(secs);
            }
            let pipeline = Pipeline::from_config(&resolved)?;

            watch(
                &pipeline,
                resolved.poll_interval,
                num_samples,
                json_out.as_deref(),
                csv.as_deref(),
                tokio::signal::ctrl_c(),
            )
            .await;
        }
        Commands::Inspect { source, kind } => {
            let resolved = config.resolve()?;
            let bytes = fetcher(&source, resolved.request_timeout, resolved.connect_timeout).await?;
            let feed = decode(&bytes, kind)?;
            let extractor =
                Extractor::new(Projector::new(), resolved.timezone, resolved.include_label);

            info!(entity_count = feed.entity.len(), feed = %kind, "Feed decoded");
            match kind {
                FeedKind::VehiclePositions => {
                    for record in extractor.extract_vehicles(&feed.entity) {
                        info!("{}", serde_json::to_string(&record)?);
                    }
                }
                FeedKind::TripUpdates => {
                    for record in extractor.extract_delays(&feed.entity) {
                        info!("{}", serde_json::to_string(&record)?);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(timeout, connect_timeout))]
async fn fetcher(source: &str, timeout: Duration, connect_timeout: Duration) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new(timeout, connect_timeout)?;
        let url = source
            .parse::<reqwest::Url>()
            .with_context(|| format!("invalid url {source}"))?;
        fetch_bytes(&client, &url).await?.to_vec()
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    Ok(bytes)
}

/// Logs the summary of one tick and writes the requested outputs.
fn report(snapshot: &Snapshot, json_out: Option<&str>, csv: Option<&str>) -> Result<()> {
    let summary = FleetSummary::from_snapshot(snapshot);

    if snapshot.records.is_empty() {
        warn!(updated_at = %snapshot.updated_at, "No data received");
    } else {
        info!(
            updated_at = %snapshot.updated_at,
            rows = summary.total,
            in_transit = summary.in_transit,
            stopped = summary.stopped,
            fleet = summary.fleet,
            on_time = summary.on_time,
            late = summary.late,
            "Fleet summary"
        );
    }
    print_pretty(&summary);

    if let Some(path) = json_out {
        write_snapshot(path, snapshot)?;
    }
    if let Some(path) = csv {
        append_record(path, &summary)?;
    }
    if json_out.is_none() && csv.is_none() {
        print_json(&summary)?;
    }
    Ok(())
}

/// Fixed-period polling loop. Ticks run one after another, so a slow poll
/// delays the next one instead of overlapping it.
///
/// Stops after `num_samples` ticks (0 = no limit) or once `shutdown`
/// resolves, including when it resolves during a tick. Returns the number of
/// ticks run.
#[tracing::instrument(skip(pipeline, json_out, csv, shutdown))]
async fn watch<F: Future>(
    pipeline: &Pipeline,
    period: Duration,
    num_samples: usize,
    json_out: Option<&str>,
    csv: Option<&str>,
    shutdown: F,
) -> usize {
    if num_samples == 0 {
        info!(period_secs = period.as_secs(), "Polling until Ctrl+C");
    } else {
        info!(num_samples, period_secs = period.as_secs(), "Starting polling");
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);

    let mut sample_count = 0;
    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Interrupted, stopping");
                break;
            }
            _ = ticker.tick() => {}
        }

        sample_count += 1;
        let snapshot = pipeline.tick().await;
        if let Err(e) = report(&snapshot, json_out, csv) {
            error!(error = %e, sample = sample_count, "Failed to write tick output");
        }
    }

    info!(samples = sample_count, "Finished polling");
    sample_count
}
