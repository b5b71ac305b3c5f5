//! Command line interface.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use datarods::{
    get_cache_dir, offset_from_hours, Datarods, LatLon, ModelVersion, PipelineConfig, Variable,
    DEFAULT_BASE_URL, DEFAULT_COLLECTION,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Fetch data rods time series for a point and write rolling-window features
struct Cli {
    /// Latitude of the point
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the point
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Hours added to UTC timestamps before taking the calendar date, applied as given
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_hours: i32,

    /// Summary table to write
    #[arg(long, short)]
    output: PathBuf,

    /// Also write the daily records to this file
    #[arg(long)]
    daily_output: Option<PathBuf>,

    /// Directory for downloaded artifacts [default: user cache dir]
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Model version as TAG=START,END (repeatable) [default: GLDAS Noah v2.0 and v2.1]
    #[arg(long = "version-range", value_name = "TAG=START,END")]
    versions: Vec<ModelVersion>,

    /// Variable to fetch (repeatable) [default: all four]
    #[arg(long = "variable", value_name = "NAME")]
    variables: Vec<Variable>,

    /// Rolling window length in days (repeatable)
    #[arg(long = "window", default_values_t = [5usize, 7])]
    windows: Vec<usize>,

    /// Drop daily records before this date
    #[arg(long)]
    floor_date: Option<NaiveDate>,

    /// Reuse artifacts already on disk instead of downloading again
    #[arg(long)]
    reuse_artifacts: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout_secs: u64,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = DEFAULT_COLLECTION)]
    collection: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let artifact_dir = match cli.artifact_dir {
        Some(dir) => dir,
        None => get_cache_dir().context("No --artifact-dir given")?,
    };
    let versions = if cli.versions.is_empty() {
        ModelVersion::gldas_defaults()
    } else {
        cli.versions
    };
    let variables = if cli.variables.is_empty() {
        Variable::ALL.to_vec()
    } else {
        cli.variables
    };

    let config = PipelineConfig::builder()
        .location(LatLon(cli.lat, cli.lon))
        .versions(versions)
        .variables(variables)
        .artifact_dir(artifact_dir)
        .output_path(cli.output)
        .maybe_daily_output_path(cli.daily_output)
        .window_lengths(cli.windows)
        .local_offset(offset_from_hours(cli.utc_offset_hours)?)
        .maybe_floor_date(cli.floor_date)
        .base_url(cli.base_url)
        .collection(cli.collection)
        .request_timeout(Duration::from_secs(cli.timeout_secs))
        .reuse_artifacts(cli.reuse_artifacts)
        .build();

    let report = Datarods::new(config)?.run().await?;

    for artifact in &report.artifacts {
        println!("{:<45} {}", artifact.query.artifact_name(), artifact.status);
    }
    for variable in &report.absent_variables {
        println!("No data available for {}", variable);
    }
    println!(
        "{} days, {} summary rows saved to `{}`",
        report.daily_records,
        report.summary_rows,
        report.output_path.display()
    );
    if !report.is_complete() {
        eprintln!("Warning: {} artifact(s) failed", report.failures().count());
    }

    Ok(())
}
