//! Row types flowing through the pipeline.
//!
//! Each stage produces a new collection of these; nothing is mutated after it is built.

use crate::types::variable::{Statistic, Variable};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

/// A single parsed value from one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub variable: Variable,
    pub version: String,
    /// `None` when the cell was empty, non-numeric or a fill value.
    pub value: Option<f64>,
}

/// All variables observed at one timestamp, after duplicate averaging.
///
/// A variable absent from `values` had no usable observation at this timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<Variable, f64>,
}

impl MergedRow {
    pub fn get(&self, variable: Variable) -> Option<f64> {
        self.values.get(&variable).copied()
    }
}

/// The seven derived statistics. Used both for a single day and for a window of days.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyStats {
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub precip: Option<f64>,
    pub sol_rad: Option<f64>,
    pub max_wind: Option<f64>,
    pub mean_wind: Option<f64>,
    pub min_wind: Option<f64>,
}

impl DailyStats {
    pub fn get(&self, statistic: Statistic) -> Option<f64> {
        match statistic {
            Statistic::MaxTemp => self.max_temp,
            Statistic::MinTemp => self.min_temp,
            Statistic::Precip => self.precip,
            Statistic::SolRad => self.sol_rad,
            Statistic::MaxWind => self.max_wind,
            Statistic::MeanWind => self.mean_wind,
            Statistic::MinWind => self.min_wind,
        }
    }

    pub fn set(&mut self, statistic: Statistic, value: Option<f64>) {
        let slot = match statistic {
            Statistic::MaxTemp => &mut self.max_temp,
            Statistic::MinTemp => &mut self.min_temp,
            Statistic::Precip => &mut self.precip,
            Statistic::SolRad => &mut self.sol_rad,
            Statistic::MaxWind => &mut self.max_wind,
            Statistic::MeanWind => &mut self.mean_wind,
            Statistic::MinWind => &mut self.min_wind,
        };
        *slot = value;
    }

    /// Builds stats by evaluating `f` for every statistic.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Statistic) -> Option<f64>,
    {
        let mut stats = DailyStats::default();
        for statistic in Statistic::ALL {
            stats.set(statistic, f(statistic));
        }
        stats
    }
}

/// One civil day of reduced observations.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub stats: DailyStats,
}

/// A trailing window summary, dated by the window's most recent day.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingRecord {
    pub date: NaiveDate,
    pub window: usize,
    pub stats: DailyStats,
}

/// One row of the exported table: a date and the stats of every window that ends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub date: NaiveDate,
    pub windows: BTreeMap<usize, DailyStats>,
}

impl SummaryRow {
    pub fn get(&self, window: usize, statistic: Statistic) -> Option<f64> {
        self.windows.get(&window).and_then(|s| s.get(statistic))
    }
}
