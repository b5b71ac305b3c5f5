use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Artifact name '{0}' does not match '{{version}}_{{variable}}.csv'")]
    ArtifactName(String),

    #[error("Failed to read artifact '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Artifact '{path}' has {found} lines, fewer than the {expected}-line header")]
    TruncatedHeader {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Parsing error processing CSV data in '{path}'")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}
