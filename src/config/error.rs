use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Model version '{tag}' has start {start} not before end {end}")]
    InvalidDateRange {
        tag: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Model version '{0}' is configured more than once")]
    DuplicateVersion(String),

    #[error("Model version tag must not be empty")]
    EmptyVersionTag,

    #[error("Variable '{0}' is configured more than once")]
    DuplicateVariable(String),

    #[error("No model versions configured")]
    NoVersions,

    #[error("No variables configured")]
    NoVariables,

    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("No rolling window lengths configured")]
    NoWindows,

    #[error("Rolling window length must be at least 1")]
    ZeroWindow,

    #[error("Local offset of {0} hours is not a valid UTC offset")]
    InvalidOffset(i32),

    #[error("Invalid model version range '{input}': {reason}")]
    InvalidVersionRange { input: String, reason: String },
}
