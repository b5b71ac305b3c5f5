//! Reads `type=asc2` artifacts into [`Observation`]s.
//!
//! An artifact is a 12-line preamble followed by tab-separated `timestamp<TAB>value`
//! lines. Timestamps are UTC and are not converted here.

use crate::processing::error::ParseError;
use crate::types::records::Observation;
use crate::types::variable::Variable;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const HEADER_LINES: usize = 12;

/// Values at or below this are the service's fill value.
const FILL_VALUE: f64 = -9999.0;

const COL_TIMESTAMP: &str = "timestamp";
const COL_VALUE: &str = "value";

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// The version and variable recovered from an artifact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    pub version: String,
    pub variable: Variable,
}

impl ArtifactName {
    /// Splits `{version}_{variable}.csv`. The variable is matched as a known suffix,
    /// so version tags may contain underscores and dots.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ParseError::ArtifactName(path.display().to_string()))?;
        let stem = file_name
            .strip_suffix(".csv")
            .ok_or_else(|| ParseError::ArtifactName(file_name.to_string()))?;

        Variable::ALL
            .into_iter()
            .find_map(|variable| {
                stem.strip_suffix(variable.dataset_name())
                    .and_then(|rest| rest.strip_suffix('_'))
                    .filter(|version| !version.is_empty())
                    .map(|version| ArtifactName {
                        version: version.to_string(),
                        variable,
                    })
            })
            .ok_or_else(|| ParseError::ArtifactName(file_name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArtifact {
    pub name: ArtifactName,
    pub observations: Vec<Observation>,
    /// Rows dropped because their timestamp could not be read.
    pub skipped_rows: usize,
}

/// Reads and parses the artifact at `path`.
pub fn parse_artifact(path: &Path) -> Result<ParsedArtifact, ParseError> {
    let name = ArtifactName::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| ParseError::Read(path.to_path_buf(), e))?;
    parse_asc2(&bytes, name, path)
}

/// Parses artifact contents. `path` is only used in error messages.
pub fn parse_asc2(
    bytes: &[u8],
    name: ArtifactName,
    path: &Path,
) -> Result<ParsedArtifact, ParseError> {
    let body = strip_header(bytes).map_err(|found| ParseError::TruncatedHeader {
        path: path.to_path_buf(),
        expected: HEADER_LINES,
        found,
    })?;

    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("Artifact {:?} has a header but no data rows", path);
        return Ok(ParsedArtifact {
            name,
            observations: Vec::new(),
            skipped_rows: 0,
        });
    }

    let df = read_body(body, path.to_path_buf())?;
    let csv_err = |e: PolarsError| ParseError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let timestamps = df
        .column(COL_TIMESTAMP)
        .and_then(|c| c.str())
        .map_err(csv_err)?;
    let values = df.column(COL_VALUE).and_then(|c| c.str()).map_err(csv_err)?;

    let mut observations = Vec::with_capacity(df.height());
    let mut skipped_rows = 0;
    for (raw_ts, raw_value) in timestamps.into_iter().zip(values.into_iter()) {
        match raw_ts.and_then(parse_timestamp) {
            Some(timestamp) => observations.push(Observation {
                timestamp,
                variable: name.variable,
                version: name.version.clone(),
                value: raw_value.and_then(parse_value),
            }),
            // Blank lines are not worth reporting.
            None if raw_ts.map_or(true, |s| s.trim().is_empty()) && raw_value.is_none() => {}
            None => skipped_rows += 1,
        }
    }

    if skipped_rows > 0 {
        warn!(
            "Skipped {} row(s) with unreadable timestamps in {:?}",
            skipped_rows, path
        );
    }
    debug!(
        "Parsed {} observations of {} ({}) from {:?}",
        observations.len(),
        name.variable,
        name.version,
        path
    );

    Ok(ParsedArtifact {
        name,
        observations,
        skipped_rows,
    })
}

/// Returns the bytes after the header, or the number of lines found if the header is incomplete.
fn strip_header(bytes: &[u8]) -> Result<&[u8], usize> {
    let mut newlines = 0;
    for (idx, byte) in bytes.iter().enumerate() {
        if *byte == b'\n' {
            newlines += 1;
            if newlines == HEADER_LINES {
                return Ok(&bytes[idx + 1..]);
            }
        }
    }
    // A header-only file without a trailing newline.
    let trailing = usize::from(bytes.last().is_some_and(|b| *b != b'\n'));
    if newlines + trailing == HEADER_LINES {
        Ok(&[])
    } else {
        Err(newlines + trailing)
    }
}

/// Reads the tab-separated body as two text columns.
///
/// Quoting is disabled and the schema is fixed, so a stray `"` or a row without a
/// value cell only affects its own row.
fn read_body(body: &[u8], path: PathBuf) -> Result<DataFrame, ParseError> {
    let schema = Schema::from_iter([
        (PlSmallStr::from_static(COL_TIMESTAMP), DataType::String),
        (PlSmallStr::from_static(COL_VALUE), DataType::String),
    ]);
    CsvReadOptions::default()
        .with_has_header(false)
        .with_schema(Some(Arc::new(schema)))
        .map_parse_options(|opts| {
            opts.with_separator(b'\t')
                .with_quote_char(None)
                .with_truncate_ragged_lines(true)
        })
        .into_reader_with_file_handle(Cursor::new(body.to_vec()))
        .finish()
        .map_err(|e| ParseError::Csv { path, source: e })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_end_matches('Z');
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    // Hour-only forms such as `2000-01-01T03` or `2000-01-01 03Z`.
    let (date, hour) = raw.split_once(|c: char| c == 'T' || c == ' ')?;
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let hour: u32 = hour.trim().parse().ok()?;
    date.and_hms_opt(hour, 0, 0).map(|dt| dt.and_utc())
}

fn parse_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > FILL_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HEADER: &str = "prod_name:\tGLDAS_NOAH025_3H_v2.1\n\
        param_short_name:\tTair_f_inst\n\
        param_name:\tNear surface air temperature\n\
        unit:\tK\n\
        begin_time:\t2000-01-01T00\n\
        end_time:\t2000-01-02T00\n\
        time_interval[sec]:\t10800\n\
        tot_record:\t4\n\
        grid_y:\t479\n\
        grid_x:\t338\n\
        lat:\t29.875\n\
        lon:\t-95.375\n";

    fn name() -> ArtifactName {
        ArtifactName {
            version: "GLDAS_NOAH025_3H_v2.1".to_string(),
            variable: Variable::Temperature,
        }
    }

    fn parse(body: &str) -> Result<ParsedArtifact, ParseError> {
        let text = format!("{HEADER}{body}");
        parse_asc2(text.as_bytes(), name(), Path::new("test.csv"))
    }

    #[test]
    fn test_artifact_name_round_trip() {
        let parsed =
            ArtifactName::from_path(Path::new("/tmp/GLDAS_NOAH025_3H_v2.0_SWdown_f_tavg.csv"))
                .unwrap();
        assert_eq!(parsed.version, "GLDAS_NOAH025_3H_v2.0");
        assert_eq!(parsed.variable, Variable::SolarRadiation);

        assert!(ArtifactName::from_path(Path::new("Tair_f_inst.csv")).is_err());
        assert!(ArtifactName::from_path(Path::new("v2_Tair_f_inst.txt")).is_err());
        assert!(ArtifactName::from_path(Path::new("v2_Qair_f_inst.csv")).is_err());
    }

    #[test]
    fn test_parses_rows_after_header() {
        let parsed = parse("2000-01-01T00:00:00\t280.5\n2000-01-01T03:00:00\t281.25\n").unwrap();
        assert_eq!(parsed.observations.len(), 2);
        assert_eq!(parsed.skipped_rows, 0);
        let first = &parsed.observations[0];
        assert_eq!(first.timestamp, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(first.value, Some(280.5));
        assert_eq!(first.variable, Variable::Temperature);
        assert_eq!(first.version, "GLDAS_NOAH025_3H_v2.1");
    }

    #[test]
    fn test_bad_values_become_missing_and_bad_timestamps_are_skipped() {
        let parsed = parse(
            "2000-01-01T00:00:00\tn/a\n\
             2000-01-01T03:00:00\t-9999\n\
             not-a-time\t1.0\n\
             2000-01-01T06:00:00\t 282.0 \n",
        )
        .unwrap();
        assert_eq!(parsed.observations.len(), 3);
        assert_eq!(parsed.skipped_rows, 1);
        assert_eq!(parsed.observations[0].value, None);
        assert_eq!(parsed.observations[1].value, None);
        assert_eq!(parsed.observations[2].value, Some(282.0));
    }

    #[test]
    fn test_stray_quote_only_affects_its_row() {
        let parsed = parse(
            "2000-01-01T00:00:00\t\"bad\n\
             2000-01-01T03:00:00\t1.0\n\
             2000-01-01T06:00:00\t2.0\n",
        )
        .unwrap();
        assert_eq!(parsed.observations.len(), 3);
        assert_eq!(parsed.observations[0].value, None);
        assert_eq!(parsed.observations[1].value, Some(1.0));
        assert_eq!(parsed.observations[2].value, Some(2.0));
    }

    #[test]
    fn test_row_without_value_cell_is_missing() {
        let parsed = parse(
            "2000-01-01T00:00:00\n\
             2000-01-01T03:00:00\t1.0\n\
             2000-01-01T06:00:00\t2.0\n",
        )
        .unwrap();
        assert_eq!(parsed.observations.len(), 3);
        assert_eq!(parsed.skipped_rows, 0);
        assert_eq!(parsed.observations[0].value, None);
        assert_eq!(
            parsed.observations[0].timestamp,
            Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(parsed.observations[2].value, Some(2.0));
    }

    #[test]
    fn test_header_only_and_truncated_files() {
        assert!(parse("").unwrap().observations.is_empty());

        let truncated = parse_asc2(b"one\ntwo\n", name(), Path::new("short.csv"));
        assert!(matches!(
            truncated,
            Err(ParseError::TruncatedHeader { found: 2, .. })
        ));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2010, 6, 1, 3, 0, 0).unwrap();
        for raw in [
            "2010-06-01T03:00:00",
            "2010-06-01T03:00",
            "2010-06-01 03:00:00",
            "2010-06-01 03Z",
            "2010-06-01T03",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_timestamp("2010-13-01T00"), None);
    }
}
