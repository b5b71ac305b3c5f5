//! MergedRow → DailyRecord.

use crate::types::records::{DailyRecord, DailyStats, MergedRow};
use crate::types::variable::{Statistic, Variable};
use chrono::{FixedOffset, NaiveDate};
use std::collections::BTreeMap;

/// The calendar date of `row` once its UTC timestamp is shifted by `offset`.
pub fn civil_date(row: &MergedRow, offset: FixedOffset) -> NaiveDate {
    row.timestamp.with_timezone(&offset).date_naive()
}

/// Reduces merged rows to one record per civil date.
///
/// Temperature gives max and min, wind gives max, mean and min, and precipitation and
/// solar radiation are summed over the day's samples. Missing samples are skipped; a
/// variable with no sample on a date leaves its statistics missing for that date.
/// Dates before `floor` are dropped. Output is ascending by date.
pub fn aggregate_daily(
    rows: &[MergedRow],
    offset: FixedOffset,
    floor: Option<NaiveDate>,
) -> Vec<DailyRecord> {
    let mut days: BTreeMap<NaiveDate, BTreeMap<Variable, Vec<f64>>> = BTreeMap::new();

    for row in rows {
        let date = civil_date(row, offset);
        if floor.is_some_and(|floor| date < floor) {
            continue;
        }
        let samples = days.entry(date).or_default();
        for (variable, value) in &row.values {
            samples.entry(*variable).or_default().push(*value);
        }
    }

    days.into_iter()
        .map(|(date, samples)| DailyRecord {
            date,
            stats: DailyStats::from_fn(|statistic: Statistic| {
                samples
                    .get(&statistic.source())
                    .and_then(|values| statistic.reducer().reduce(values.iter().copied()))
            }),
        })
        .collect()
}
