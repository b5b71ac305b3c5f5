//! Trailing windows over the daily sequence.

use crate::types::records::{DailyRecord, DailyStats, RollingRecord};

/// Right-aligned windows of `window` consecutive daily records.
///
/// Windows are positional: a gap in the calendar makes a window cover more than
/// `window` days. The first `window - 1` positions produce no record. Each statistic
/// uses its own reducer over the window and is missing if any day in the window is.
pub fn rolling_summary(daily: &[DailyRecord], window: usize) -> Vec<RollingRecord> {
    if window == 0 {
        return Vec::new();
    }
    daily
        .windows(window)
        .map(|days| RollingRecord {
            // `windows` never yields an empty slice.
            date: days[days.len() - 1].date,
            window,
            stats: DailyStats::from_fn(|statistic| {
                let values: Option<Vec<f64>> =
                    days.iter().map(|d| d.stats.get(statistic)).collect();
                values.and_then(|v| statistic.reducer().reduce(v))
            }),
        })
        .collect()
}
