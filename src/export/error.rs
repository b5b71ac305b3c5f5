use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to build output table")]
    Frame(#[source] PolarsError),

    #[error("I/O error writing table '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing table '{0}'")]
    WritePolars(PathBuf, #[source] PolarsError),

    #[error("Failed to read table '{0}'")]
    Read(PathBuf, #[source] PolarsError),

    #[error("Table '{0}' has no 'date' column")]
    MissingDateColumn(PathBuf),

    #[error("Unexpected column '{column}' in '{path}'")]
    UnknownColumn { path: PathBuf, column: String },

    #[error("Invalid value '{value}' in column '{column}', row {row} of '{path}'")]
    InvalidValue {
        path: PathBuf,
        column: String,
        row: usize,
        value: String,
    },
}
