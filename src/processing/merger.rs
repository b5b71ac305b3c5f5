//! Observation → MergedRow: duplicate averaging and long-to-wide pivot.

use crate::types::records::{MergedRow, Observation};
use crate::types::variable::Variable;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Merges observations from all variables and versions into one row per timestamp.
///
/// When several versions report the same (timestamp, variable), the row holds the
/// mean of the values that are present. Missing values never count as zero. Every
/// distinct input timestamp yields a row, even when none of its values are usable.
pub fn merge_observations(observations: &[Observation]) -> Vec<MergedRow> {
    let mut grouped: BTreeMap<DateTime<Utc>, BTreeMap<Variable, Accumulator>> = BTreeMap::new();

    for obs in observations {
        let by_variable = grouped.entry(obs.timestamp).or_default();
        if let Some(value) = obs.value {
            let acc = by_variable.entry(obs.variable).or_default();
            acc.sum += value;
            acc.count += 1;
        }
    }

    grouped
        .into_iter()
        .map(|(timestamp, by_variable)| MergedRow {
            timestamp,
            values: by_variable
                .into_iter()
                .map(|(variable, acc)| (variable, acc.sum / acc.count as f64))
                .collect(),
        })
        .collect()
}

/// Variables that never appear with a value in `rows`.
pub fn absent_variables(rows: &[MergedRow], expected: &[Variable]) -> Vec<Variable> {
    expected
        .iter()
        .copied()
        .filter(|v| !rows.iter().any(|row| row.values.contains_key(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn obs(hour: u32, variable: Variable, version: &str, value: Option<f64>) -> Observation {
        Observation {
            timestamp: Utc.with_ymd_and_hms(2005, 3, 1, hour, 0, 0).unwrap(),
            variable,
            version: version.to_string(),
            value,
        }
    }

    #[test]
    fn test_single_version_value_is_kept_as_is() {
        let rows = merge_observations(&[obs(0, Variable::Wind, "v2.0", Some(3.3))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(Variable::Wind), Some(3.3));
    }

    #[test]
    fn test_overlapping_versions_are_averaged() {
        let rows = merge_observations(&[
            obs(0, Variable::Temperature, "v2.0", Some(280.0)),
            obs(0, Variable::Temperature, "v2.1", Some(284.0)),
            obs(3, Variable::Temperature, "v2.1", Some(290.0)),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(Variable::Temperature), Some(282.0));
        assert_eq!(rows[1].get(Variable::Temperature), Some(290.0));
    }

    #[test]
    fn test_missing_values_are_not_zero() {
        let rows = merge_observations(&[
            obs(0, Variable::Precipitation, "v2.0", None),
            obs(0, Variable::Precipitation, "v2.1", Some(2.0)),
            obs(3, Variable::Precipitation, "v2.1", None),
            obs(3, Variable::Wind, "v2.1", Some(1.0)),
        ]);
        // One missing and one present value: the present one wins.
        assert_eq!(rows[0].get(Variable::Precipitation), Some(2.0));
        // Timestamp is kept even though precipitation is missing there.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get(Variable::Precipitation), None);
        assert_eq!(rows[1].get(Variable::Wind), Some(1.0));
        assert_eq!(rows[0].get(Variable::Wind), None);
    }

    #[test]
    fn test_row_count_matches_distinct_timestamps() {
        let rows = merge_observations(&[
            obs(6, Variable::Wind, "v2.1", Some(1.0)),
            obs(0, Variable::SolarRadiation, "v2.1", Some(10.0)),
            obs(3, Variable::Temperature, "v2.0", None),
            obs(0, Variable::Wind, "v2.0", Some(2.0)),
        ]);
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(rows[1].values.is_empty());

        assert_eq!(
            absent_variables(&rows, &Variable::ALL),
            vec![Variable::Temperature, Variable::Precipitation]
        );
    }
}
