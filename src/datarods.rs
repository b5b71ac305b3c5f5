//! The pipeline entry point: fetch, parse, merge, aggregate, roll and export.

use crate::config::pipeline_config::PipelineConfig;
use crate::error::DatarodsError;
use crate::export::summary::{join_windows, write_daily, write_summary};
use crate::fetch::loader::ArtifactLoader;
use crate::processing::daily::aggregate_daily;
use crate::processing::error::ParseError;
use crate::processing::merger::{absent_variables, merge_observations};
use crate::processing::parser::{parse_artifact, ParsedArtifact};
use crate::processing::rolling::rolling_summary;
use crate::report::{ArtifactReport, ArtifactStatus, RunReport};
use crate::request::query::{build_queries, QueryDescriptor};
use crate::types::records::{DailyRecord, MergedRow, Observation, SummaryRow};
use log::{info, warn};
use std::path::PathBuf;
use tokio::task;

/// Every intermediate table derived from a set of observations.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub merged: Vec<MergedRow>,
    pub daily: Vec<DailyRecord>,
    pub rows: Vec<SummaryRow>,
}

/// Runs the pipeline for one configured point.
///
/// # Examples
///
/// ```no_run
/// use datarods::{Datarods, DatarodsError, LatLon, PipelineConfig};
/// use chrono::FixedOffset;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), DatarodsError> {
/// let config = PipelineConfig::builder()
///     .location(LatLon(29.76, -95.37))
///     .artifact_dir("data/artifacts")
///     .output_path("data/rolling_summary.csv")
///     .local_offset(FixedOffset::east_opt(6 * 3600).unwrap())
///     .build();
///
/// let report = Datarods::new(config)?.run().await?;
/// for artifact in &report.artifacts {
///     println!("{}: {}", artifact.query.artifact_name(), artifact.status);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Datarods {
    config: PipelineConfig,
    loader: ArtifactLoader,
}

impl Datarods {
    /// Validates `config` and prepares the HTTP client. No network activity happens here.
    ///
    /// # Errors
    ///
    /// Returns [`DatarodsError::Config`] for an invalid configuration and
    /// [`DatarodsError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, DatarodsError> {
        config.validate()?;
        let loader = ArtifactLoader::new(
            &config.artifact_dir,
            config.request_timeout,
            config.reuse_artifacts,
        )?;
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn queries(&self) -> Vec<QueryDescriptor> {
        build_queries(&self.config)
    }

    /// Runs the whole pipeline and writes the summary table.
    ///
    /// A failed fetch or unreadable artifact is logged and recorded in the report;
    /// the remaining artifacts are still processed.
    ///
    /// # Errors
    ///
    /// Only directory creation, table export and background task failures abort the run.
    pub async fn run(&self) -> Result<RunReport, DatarodsError> {
        tokio::fs::create_dir_all(&self.config.artifact_dir)
            .await
            .map_err(|e| DatarodsError::ArtifactDirCreation(self.config.artifact_dir.clone(), e))?;

        if self.config.offset_opposes_longitude() {
            warn!(
                "Local offset {} has the opposite sign of the civil offset implied by longitude {}; \
                 dates are assigned with the offset as configured",
                self.config.local_offset, self.config.location.1
            );
        }

        let queries = self.queries();
        info!("Fetching {} artifacts", queries.len());
        let fetched = self.loader.fetch_all(&queries).await;

        let mut artifacts = Vec::with_capacity(queries.len());
        let mut observations = Vec::new();
        for (query, result) in queries.into_iter().zip(fetched) {
            let status = match result {
                Err(e) => {
                    warn!("Skipping {}: {}", query.artifact_name(), e);
                    ArtifactStatus::FetchFailed(e)
                }
                Ok(artifact) => match parse_in_background(artifact.path).await? {
                    Ok(parsed) => {
                        if parsed.observations.is_empty() {
                            warn!("No data available in {}", query.artifact_name());
                        }
                        let status = ArtifactStatus::Parsed {
                            source: artifact.source,
                            observations: parsed.observations.len(),
                            skipped_rows: parsed.skipped_rows,
                        };
                        observations.extend(parsed.observations);
                        status
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", query.artifact_name(), e);
                        ArtifactStatus::ParseFailed(e)
                    }
                },
            };
            artifacts.push(ArtifactReport { query, status });
        }

        let summary = self.summarize(&observations);
        let absent = absent_variables(&summary.merged, &self.config.variables);
        for variable in &absent {
            warn!("No data available for {} from any model version", variable);
        }

        self.export(&summary).await?;

        Ok(RunReport {
            artifacts,
            absent_variables: absent,
            merged_rows: summary.merged.len(),
            daily_records: summary.daily.len(),
            summary_rows: summary.rows.len(),
            output_path: self.config.output_path.clone(),
        })
    }

    /// Merges, aggregates and rolls `observations` with this pipeline's settings.
    pub fn summarize(&self, observations: &[Observation]) -> Summary {
        let merged = merge_observations(observations);
        let daily = aggregate_daily(&merged, self.config.local_offset, self.config.floor_date);
        let rolling: Vec<_> = self
            .config
            .windows()
            .into_iter()
            .flat_map(|window| rolling_summary(&daily, window))
            .collect();
        let rows = join_windows(&rolling);
        info!(
            "{} observations -> {} merged rows -> {} days -> {} summary rows",
            observations.len(),
            merged.len(),
            daily.len(),
            rows.len()
        );
        Summary {
            merged,
            daily,
            rows,
        }
    }

    async fn export(&self, summary: &Summary) -> Result<(), DatarodsError> {
        let output = self.config.output_path.clone();
        let rows = summary.rows.clone();
        let windows = self.config.windows();
        task::spawn_blocking(move || write_summary(&output, &rows, &windows)).await??;

        if let Some(daily_path) = self.config.daily_output_path.clone() {
            let daily = summary.daily.clone();
            task::spawn_blocking(move || write_daily(&daily_path, &daily)).await??;
        }
        Ok(())
    }
}

async fn parse_in_background(
    path: PathBuf,
) -> Result<Result<ParsedArtifact, ParseError>, DatarodsError> {
    Ok(task::spawn_blocking(move || parse_artifact(&path)).await?)
}
