#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the district fraud-risk audit toolkit.
//!
//! Prints filtered risk reports and regional rollups from the built-in
//! dataset or a CSV file, talks to the remote inference server, requests
//! AI strategy summaries and starts the API server.

mod report;

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use vigil_aadhaar_ai::{insight::FALLBACK_ADVISORY, providers::create_provider_from_env};
use vigil_aadhaar_analytics::top_offenders;
use vigil_aadhaar_audit_models::RegionFilter;
use vigil_aadhaar_dashboard::{
    DashboardEvent, DashboardSettings, DashboardState, DataSource, InsightState, UploadStatus,
    actions::{request_insight, run_inference},
    reduce,
};
use vigil_aadhaar_inference::InferenceClient;
use vigil_aadhaar_ingest::load_csv_file;

/// Number of regions listed as top offenders.
const TOP_OFFENDERS: usize = 5;

#[derive(Parser)]
#[command(name = "vigil_aadhaar", about = "District ghost-child fraud-risk audit toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// CSV file to load instead of the built-in dataset
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive substring of the district or region name
    #[arg(long, default_value = "")]
    search: String,
    /// Exact region name, or `ALL`
    #[arg(long, default_value = "ALL")]
    region: String,
    /// Minimum risk score (inclusive)
    #[arg(long, default_value = "0")]
    threshold: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Print rollups, top offending regions and the ranked district table
    Report {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Maximum number of table rows
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print the per-region summary table
    Regions {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Check that the inference server is reachable
    Probe,
    /// Upload a raw dataset to the inference server and print its report
    Analyze {
        /// File to upload
        path: PathBuf,
        /// Maximum number of table rows
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print an AI audit strategy for the filtered view
    Insight {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Start the API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let settings = DashboardSettings::from_env();

    match cli.command {
        Commands::Report {
            data,
            filter,
            limit,
        } => {
            let state = apply_filter(load_state(&data, &settings)?, filter);
            print_report(&state, &settings, limit);
        }
        Commands::Regions { data } => {
            let state = load_state(&data, &settings)?;
            print!("{}", report::all_regions(&state.region_summaries()));
        }
        Commands::Probe => {
            let client = InferenceClient::from_env()?;
            let message = client.check_connection().await?;
            println!("{message}");
        }
        Commands::Analyze { path, limit } => {
            let client = InferenceClient::from_env()?;
            let bytes = std::fs::read(&path)?;
            let state = run_inference(
                &DashboardState::default(),
                &client,
                &file_name(&path),
                bytes,
            )
            .await;

            for entry in &state.logs {
                println!("{entry}");
            }
            if state.upload == UploadStatus::Failed {
                return Err(format!("Analysis of {} failed", path.display()).into());
            }
            if state.source == DataSource::Mock {
                println!("Server returned no data; nothing to report.");
            } else {
                println!();
                print_report(&state, &settings, limit);
            }
        }
        Commands::Insight { data, filter } => {
            let state = apply_filter(load_state(&data, &settings)?, filter);
            match create_provider_from_env() {
                Ok(provider) => {
                    let state =
                        request_insight(&state, provider.as_ref(), settings.subsidy_per_child)
                            .await;
                    if let InsightState::Ready(text) = state.insight {
                        println!("{text}");
                    }
                }
                Err(e) => {
                    log::warn!("No LLM provider available: {e}");
                    println!("{FALLBACK_ADVISORY}");
                }
            }
        }
        Commands::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(vigil_aadhaar_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

/// Loads the record store from `--csv`, or the built-in dataset.
fn load_state(
    data: &DataArgs,
    settings: &DashboardSettings,
) -> Result<DashboardState, Box<dyn std::error::Error>> {
    let Some(path) = &data.csv else {
        return Ok(DashboardState::default());
    };

    let report = load_csv_file(path, &settings.ingest)?;
    log::info!(
        "Loaded {} records from {} ({} rows skipped)",
        report.records.len(),
        path.display(),
        report.skipped_rows
    );

    Ok(DashboardState::with_records(
        report.records,
        DataSource::Csv {
            file_name: file_name(path),
        },
    ))
}

/// Applies the command-line filter through the reducer.
fn apply_filter(state: DashboardState, filter: FilterArgs) -> DashboardState {
    [
        DashboardEvent::SearchChanged {
            search: filter.search,
        },
        DashboardEvent::RegionSelected {
            region: RegionFilter::from(filter.region),
        },
        DashboardEvent::ThresholdChanged {
            threshold: filter.threshold,
        },
    ]
    .into_iter()
    .fold(state, |state, event| reduce(&state, event, Utc::now()))
}

fn print_report(state: &DashboardState, settings: &DashboardSettings, limit: usize) {
    let view = state.view(settings.subsidy_per_child);
    let summaries = state.region_summaries();

    print!("{}", report::rollups(&view));
    println!();
    println!("Top offending regions:");
    print!(
        "{}",
        report::ranked_regions(&top_offenders(&summaries, TOP_OFFENDERS))
    );
    println!();
    print!("{}", report::records_table(&view.filtered_records, limit));
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
