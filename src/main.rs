//! CLI entry point for the station crowd estimator.
//!
//! Provides subcommands for producing the station crowd dataset and for
//! inspecting the line registry it is computed with.

use anyhow::Result;
use chrono::Timelike;
use clap::{Parser, Subcommand};
use station_crowd::{
    config::CrowdConfig,
    estimator::{CrowdEstimator, line_station_counts},
    fetch::BasicClient,
    output::{print_json, print_pretty, write_dataset},
    sources::{load_snapshot, load_stations},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "station_crowd")]
#[command(about = "Estimate per-station crowd levels from daily ridership", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the crowd level of every station and write the dataset
    Estimate {
        /// Stops table (CSV), as a path or URL
        #[arg(long, value_name = "FILE_OR_URL", default_value = "data.gov.my/stops.txt")]
        stops: String,

        /// Ridership table (CSV or JSON), as a path or URL
        #[arg(
            long,
            value_name = "FILE_OR_URL",
            default_value = "data.gov.my/ridership_headline.csv"
        )]
        ridership: String,

        /// JSON file to write the dataset to
        #[arg(short, long, default_value = "datasets/station.json")]
        output: String,

        /// Optional: JSON file overriding the built-in line tables
        #[arg(short, long)]
        config: Option<String>,

        /// Optional: hour of day (0-23) to estimate for instead of the current hour
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
        hour: Option<u8>,

        /// Log the dataset instead of writing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// List the line registry, optionally with station counts from a stops table
    Lines {
        /// Optional: stops table to count stations per line from
        #[arg(long, value_name = "FILE_OR_URL")]
        stops: Option<String>,

        /// Optional: JSON file overriding the built-in line tables
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/station_crowd.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("station_crowd.log"));

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

    match cli.command {
        Commands::Estimate {
            stops,
            ridership,
            output,
            config,
            hour,
            dry_run,
        } => {
            let config = load_config(config.as_deref())?;
            let hour = hour.unwrap_or_else(|| chrono::Local::now().hour() as u8);

            let client = BasicClient::new()?;
            let records = load_stations(&client, &stops)?;
            let snapshot = load_snapshot(&client, &ridership)?;

            let estimator = CrowdEstimator::new(&config, hour)?;
            info!(hour, peak = estimator.is_peak(), "Estimating crowd levels");
            let estimate = estimator.estimate(&records, &snapshot);

            let summary = &estimate.summary;
            print_pretty(summary);
            if summary.skipped_values > 0 {
                warn!(
                    skipped_values = summary.skipped_values,
                    "Some ridership values were unusable and counted as zero"
                );
            }
            info!(
                stations = summary.stations,
                lines = summary.lines,
                unmapped_stations = summary.unmapped_stations,
                mean_crowd = summary.mean_crowd,
                max_crowd = summary.max_crowd,
                saturated = summary.saturated_stations,
                "Crowd summary"
            );

            if dry_run {
                print_json(&estimate.stations)?;
            } else {
                write_dataset(&output, &estimate.stations)?;
                info!(output = %output, "Done! Dataset saved");
            }
        }
        Commands::Lines { stops, config } => {
            let config = load_config(config.as_deref())?;
            let lines = &config.lines;

            for (route_id, column) in &lines.route_to_column {
                let capacity = lines.capacity_for(Some(column.as_str()), config.default_capacity);
                info!(route_id = %route_id, column = %column, capacity, "Line");
            }

            let unrouted: Vec<_> = lines
                .line_capacity
                .keys()
                .filter(|c| !lines.route_to_column.values().any(|v| v == *c))
                .collect();
            info!(
                mapped_lines = lines.route_to_column.len(),
                ?unrouted,
                default_capacity = config.default_capacity,
                "Line registry summary"
            );

            if let Some(stops) = stops {
                let client = BasicClient::new()?;
                let records = load_stations(&client, &stops)?;
                let counts = line_station_counts(&records);

                let mut unmapped_stations = 0;
                for (route_id, count) in &counts {
                    let mapped = lines.column_for(route_id).is_some();
                    if !mapped {
                        unmapped_stations += count;
                    }
                    info!(route_id = %route_id, stations = count, mapped, "Stations per line");
                }

                info!(
                    total = records.len(),
                    lines = counts.len(),
                    unmapped_stations,
                    "Station count summary"
                );
            }
        }
    }

    Ok(())
}

/// Returns the built-in configuration, or the one at `path` if given.
fn load_config(path: Option<&str>) -> Result<CrowdConfig> {
    match path {
        Some(path) => {
            let config = CrowdConfig::load(path)?;
            info!(path, "Loaded config overrides");
            Ok(config)
        }
        None => Ok(CrowdConfig::default()),
    }
}
