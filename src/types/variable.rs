//! The climate variables requested from the data rods service and the daily
//! statistics derived from them.

use crate::config::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A forcing variable served by the data rods service.
///
/// The display form is the variable name used in queries and artifact names.
///
/// # Examples
///
/// ```
/// use datarods::Variable;
///
/// assert_eq!(Variable::Temperature.to_string(), "Tair_f_inst");
/// assert_eq!("Rainf_f_tavg".parse::<Variable>().unwrap(), Variable::Precipitation);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    /// Near-surface wind speed, instantaneous (m/s).
    Wind,
    /// Near-surface air temperature, instantaneous (K).
    Temperature,
    /// Total precipitation rate, interval average (kg m-2 s-1).
    Precipitation,
    /// Downward shortwave radiation flux, interval average (W m-2).
    SolarRadiation,
}

impl Variable {
    pub const ALL: [Variable; 4] = [
        Variable::Wind,
        Variable::Temperature,
        Variable::Precipitation,
        Variable::SolarRadiation,
    ];

    pub fn dataset_name(&self) -> &'static str {
        match self {
            Variable::Wind => "Wind_f_inst",
            Variable::Temperature => "Tair_f_inst",
            Variable::Precipitation => "Rainf_f_tavg",
            Variable::SolarRadiation => "SWdown_f_tavg",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_name())
    }
}

impl FromStr for Variable {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .into_iter()
            .find(|v| v.dataset_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownVariable(s.to_string()))
    }
}

/// How a set of values collapses into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Max,
    Min,
    Sum,
    Mean,
}

impl Reducer {
    /// Reduces the values, returning `None` for an empty input.
    pub fn reduce<I>(self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let (acc, count) = iter.fold((first, 1usize), |(acc, n), v| {
            let acc = match self {
                Reducer::Max => acc.max(v),
                Reducer::Min => acc.min(v),
                Reducer::Sum | Reducer::Mean => acc + v,
            };
            (acc, n + 1)
        });
        Some(match self {
            Reducer::Mean => acc / count as f64,
            _ => acc,
        })
    }
}

/// One derived per-day statistic.
///
/// Each statistic reads a single source [`Variable`] and uses the same
/// [`Reducer`] for the daily reduction and for the rolling windows on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Statistic {
    MaxTemp,
    MinTemp,
    Precip,
    SolRad,
    MaxWind,
    MeanWind,
    MinWind,
}

impl Statistic {
    /// Statistics in output column order.
    pub const ALL: [Statistic; 7] = [
        Statistic::MaxTemp,
        Statistic::MinTemp,
        Statistic::Precip,
        Statistic::SolRad,
        Statistic::MaxWind,
        Statistic::MeanWind,
        Statistic::MinWind,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::MaxTemp => "max_temp",
            Statistic::MinTemp => "min_temp",
            Statistic::Precip => "precip",
            Statistic::SolRad => "sol_rad",
            Statistic::MaxWind => "max_wind",
            Statistic::MeanWind => "mean_wind",
            Statistic::MinWind => "min_wind",
        }
    }

    pub fn source(&self) -> Variable {
        match self {
            Statistic::MaxTemp | Statistic::MinTemp => Variable::Temperature,
            Statistic::Precip => Variable::Precipitation,
            Statistic::SolRad => Variable::SolarRadiation,
            Statistic::MaxWind | Statistic::MeanWind | Statistic::MinWind => Variable::Wind,
        }
    }

    pub fn reducer(&self) -> Reducer {
        match self {
            Statistic::MaxTemp | Statistic::MaxWind => Reducer::Max,
            Statistic::MinTemp | Statistic::MinWind => Reducer::Min,
            // Rates are accumulated, not averaged.
            Statistic::Precip | Statistic::SolRad => Reducer::Sum,
            Statistic::MeanWind => Reducer::Mean,
        }
    }

    /// Column name of this statistic for a given window length, e.g. `precip_7d`.
    pub fn window_column(&self, window: usize) -> String {
        format!("{}_{}d", self.name(), window)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_round_trips_through_dataset_name() {
        for v in Variable::ALL {
            assert_eq!(v.dataset_name().parse::<Variable>().unwrap(), v);
        }
        assert!(matches!(
            "Qair_f_inst".parse::<Variable>(),
            Err(ConfigError::UnknownVariable(name)) if name == "Qair_f_inst"
        ));
    }

    #[test]
    fn test_reducers() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(Reducer::Max.reduce(values), Some(3.0));
        assert_eq!(Reducer::Min.reduce(values), Some(1.0));
        assert_eq!(Reducer::Sum.reduce(values), Some(6.0));
        assert_eq!(Reducer::Mean.reduce(values), Some(2.0));
        assert_eq!(Reducer::Sum.reduce(Vec::new()), None);
    }

    #[test]
    fn test_statistic_sources_cover_all_variables() {
        for v in Variable::ALL {
            assert!(Statistic::ALL.iter().any(|s| s.source() == v));
        }
        assert_eq!(Statistic::Precip.window_column(7), "precip_7d");
        assert_eq!(Statistic::Precip.reducer(), Reducer::Sum);
    }
}
