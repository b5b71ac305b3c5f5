//! Point time series from the GES DISC data rods service, reduced to daily and
//! trailing-window climate features.

mod config;
mod datarods;
mod error;
mod export;
mod fetch;
mod processing;
mod report;
mod request;
mod types;
mod utils;

pub use datarods::*;
pub use error::DatarodsError;
pub use report::*;

pub use config::error::ConfigError;
pub use config::pipeline_config::{
    offset_from_hours, LatLon, ModelVersion, PipelineConfig, DEFAULT_BASE_URL,
    DEFAULT_COLLECTION, DEFAULT_REQUEST_TIMEOUT,
};

pub use request::query::{artifact_name, build_queries, QueryDescriptor};

pub use fetch::error::FetchError;
pub use fetch::loader::{ArtifactLoader, ArtifactSource, FetchedArtifact};

pub use processing::daily::{aggregate_daily, civil_date};
pub use processing::error::ParseError;
pub use processing::merger::{absent_variables, merge_observations};
pub use processing::parser::{parse_artifact, parse_asc2, ArtifactName, ParsedArtifact, HEADER_LINES};
pub use processing::rolling::rolling_summary;

pub use export::error::ExportError;
pub use export::summary::{
    daily_frame, join_windows, read_summary, summary_frame, windows_of, write_daily,
    write_summary,
};

pub use types::records::*;
pub use types::variable::{Reducer, Statistic, Variable};

pub use utils::get_cache_dir;
