//! Caller-supplied configuration for a pipeline run.

use crate::config::error::ConfigError;
use crate::types::variable::Variable;
use bon::Builder;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://hydro1.gesdisc.eosdis.nasa.gov/daac-bin/access/timeseries.cgi";
pub const DEFAULT_COLLECTION: &str = "GLDAS2";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use datarods::LatLon;
///
/// let houston = LatLon(29.76, -95.37);
/// assert_eq!(houston.0, 29.76); // Latitude
/// assert_eq!(houston.1, -95.37); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// A dataset revision and the instant range requested from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelVersion {
    /// Dataset short name, e.g. `GLDAS_NOAH025_3H_v2.1`.
    pub tag: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ModelVersion {
    pub fn new(tag: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            tag: tag.into(),
            start,
            end,
        }
    }

    /// GLDAS Noah 0.25° 3-hourly v2.0 and v2.1, overlapping from 2000-01-01 to 2015-01-01.
    pub fn gldas_defaults() -> Vec<ModelVersion> {
        let at = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap_or_default()
                .and_time(NaiveTime::MIN)
        };
        vec![
            ModelVersion::new("GLDAS_NOAH025_3H_v2.0", at(1980, 1, 1), at(2015, 1, 1)),
            ModelVersion::new("GLDAS_NOAH025_3H_v2.1", at(2000, 1, 1), at(2024, 1, 1)),
        ]
    }
}

/// Parses `TAG=START,END`, where both instants are `YYYY-MM-DD` or `YYYY-MM-DDTHH`.
///
/// ```
/// use datarods::ModelVersion;
///
/// let v: ModelVersion = "GLDAS_NOAH025_3H_v2.1=2000-01-01,2024-01-01T00".parse().unwrap();
/// assert_eq!(v.tag, "GLDAS_NOAH025_3H_v2.1");
/// ```
impl FromStr for ModelVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidVersionRange {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (tag, range) = s.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let (start, end) = range
            .split_once(',')
            .ok_or_else(|| invalid("expected START,END"))?;
        let start = parse_instant(start.trim()).ok_or_else(|| invalid("unparseable start"))?;
        let end = parse_instant(end.trim()).ok_or_else(|| invalid("unparseable end"))?;
        Ok(ModelVersion::new(tag.trim(), start, end))
    }
}

fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    let (date, hour) = s.split_once('T')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let hour: u32 = hour.split(':').next()?.parse().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

/// Everything a run needs, passed in at construction time.
///
/// # Examples
///
/// ```
/// use datarods::{LatLon, PipelineConfig};
/// use chrono::FixedOffset;
///
/// let config = PipelineConfig::builder()
///     .location(LatLon(29.76, -95.37))
///     .artifact_dir("/tmp/datarods")
///     .output_path("/tmp/datarods/summary.csv")
///     .local_offset(FixedOffset::east_opt(6 * 3600).unwrap())
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.window_lengths, vec![5, 7]);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct PipelineConfig {
    pub location: LatLon,
    #[builder(default = ModelVersion::gldas_defaults())]
    pub versions: Vec<ModelVersion>,
    #[builder(default = Variable::ALL.to_vec())]
    pub variables: Vec<Variable>,
    /// Where downloaded `{version}_{variable}.csv` files are written.
    #[builder(into)]
    pub artifact_dir: PathBuf,
    /// The rolling summary table.
    #[builder(into)]
    pub output_path: PathBuf,
    /// Optional table of the daily records the windows were computed from.
    #[builder(into)]
    pub daily_output_path: Option<PathBuf>,
    #[builder(default = vec![5, 7])]
    pub window_lengths: Vec<usize>,
    /// Added to UTC timestamps before the calendar date is taken. Applied exactly as given.
    pub local_offset: FixedOffset,
    /// Daily records before this date are dropped.
    pub floor_date: Option<NaiveDate>,
    #[builder(default = DEFAULT_BASE_URL.to_string(), into)]
    pub base_url: String,
    #[builder(default = DEFAULT_COLLECTION.to_string(), into)]
    pub collection: String,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    /// Reuse artifacts already on disk instead of downloading them again.
    #[builder(default)]
    pub reuse_artifacts: bool,
}

impl PipelineConfig {
    /// Checks the configuration. Runs before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let LatLon(lat, lon) = self.location;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::LongitudeOutOfRange(lon));
        }

        if self.versions.is_empty() {
            return Err(ConfigError::NoVersions);
        }
        let mut tags = HashSet::new();
        for version in &self.versions {
            if version.tag.is_empty() {
                return Err(ConfigError::EmptyVersionTag);
            }
            if version.start >= version.end {
                return Err(ConfigError::InvalidDateRange {
                    tag: version.tag.clone(),
                    start: version.start,
                    end: version.end,
                });
            }
            if !tags.insert(version.tag.as_str()) {
                return Err(ConfigError::DuplicateVersion(version.tag.clone()));
            }
        }

        if self.variables.is_empty() {
            return Err(ConfigError::NoVariables);
        }
        let mut seen = HashSet::new();
        for variable in &self.variables {
            if !seen.insert(*variable) {
                return Err(ConfigError::DuplicateVariable(variable.to_string()));
            }
        }

        if self.window_lengths.is_empty() {
            return Err(ConfigError::NoWindows);
        }
        if self.window_lengths.contains(&0) {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(())
    }

    /// Window lengths in ascending order without duplicates.
    pub fn windows(&self) -> Vec<usize> {
        let mut windows = self.window_lengths.clone();
        windows.sort_unstable();
        windows.dedup();
        windows
    }

    /// True when the configured offset points the other way from the civil offset
    /// the longitude suggests (roughly `lon / 15` hours).
    pub fn offset_opposes_longitude(&self) -> bool {
        let configured = self.local_offset.local_minus_utc();
        let implied = self.location.1 / 15.0;
        implied.abs() >= 1.0 && configured != 0 && (configured > 0) != (implied > 0.0)
    }
}

/// Builds a `FixedOffset` from whole hours east of UTC.
pub fn offset_from_hours(hours: i32) -> Result<FixedOffset, ConfigError> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(ConfigError::InvalidOffset(hours))
}
