//! What happened to each query during a run.

use crate::fetch::error::FetchError;
use crate::fetch::loader::ArtifactSource;
use crate::processing::error::ParseError;
use crate::request::query::QueryDescriptor;
use crate::types::variable::Variable;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ArtifactStatus {
    /// Fetched (or reused) and parsed. Zero observations means the service had no data.
    Parsed {
        source: ArtifactSource,
        observations: usize,
        skipped_rows: usize,
    },
    /// The query did not complete; no artifact was written or parsed.
    FetchFailed(FetchError),
    /// The artifact exists but could not be read as `asc2`.
    ParseFailed(ParseError),
}

impl ArtifactStatus {
    pub fn is_failure(&self) -> bool {
        !matches!(self, ArtifactStatus::Parsed { .. })
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactStatus::Parsed {
                observations: 0, ..
            } => write!(f, "no data available"),
            ArtifactStatus::Parsed {
                source,
                observations,
                skipped_rows,
            } => {
                let origin = match source {
                    ArtifactSource::Downloaded { .. } => "downloaded",
                    ArtifactSource::Reused => "reused",
                };
                write!(f, "{origin}, {observations} observations")?;
                if *skipped_rows > 0 {
                    write!(f, ", {skipped_rows} rows skipped")?;
                }
                Ok(())
            }
            ArtifactStatus::FetchFailed(e) => write!(f, "fetch error: {e}"),
            ArtifactStatus::ParseFailed(e) => write!(f, "parse error: {e}"),
        }
    }
}

#[derive(Debug)]
pub struct ArtifactReport {
    pub query: QueryDescriptor,
    pub status: ArtifactStatus,
}

/// The outcome of [`crate::Datarods::run`].
#[derive(Debug)]
pub struct RunReport {
    pub artifacts: Vec<ArtifactReport>,
    /// Configured variables with no usable value in any artifact.
    pub absent_variables: Vec<Variable>,
    pub merged_rows: usize,
    pub daily_records: usize,
    pub summary_rows: usize,
    pub output_path: PathBuf,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.artifacts.iter().filter(|a| a.status.is_failure())
    }

    /// True when every query was fetched and parsed.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}
