//! Rain-probability derivation.
//!
//! Two policies are available; [`ProbabilityPolicy::TrendAdjusted`] is the
//! default. See [`heuristic`] and [`trend`] for the formulas.

pub mod arima;
pub mod heuristic;
pub mod params;
pub mod trend;

use crate::model::heuristic::heuristic_probability;
use crate::model::params::{HeuristicParams, TrendParams};
use crate::model::trend::{estimate_pressure_trend, trend_adjusted_probability};
use crate::partition::{forecast_horizon, partition};
use crate::types::derived::DerivedSeries;
use crate::types::hourly::HourlySeries;
use chrono::{DateTime, FixedOffset};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ProbabilityPolicy {
    Heuristic(HeuristicParams),
    TrendAdjusted(TrendParams),
}

impl ProbabilityPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ProbabilityPolicy::Heuristic(_) => "heuristic",
            ProbabilityPolicy::TrendAdjusted(_) => "trend-adjusted",
        }
    }
}

impl Default for ProbabilityPolicy {
    fn default() -> Self {
        ProbabilityPolicy::TrendAdjusted(TrendParams::default())
    }
}

impl fmt::Display for ProbabilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attaches a rain probability to every record of `series`.
///
/// For the trend-adjusted policy the pressure model is fitted to the records
/// at or before `now`; a failed fit degrades to the neutral factor and is
/// reported through [`DerivedSeries::trend`].
pub fn compute_probability(
    series: HourlySeries,
    policy: &ProbabilityPolicy,
    now: DateTime<FixedOffset>,
) -> DerivedSeries {
    match policy {
        ProbabilityPolicy::Heuristic(params) => {
            let probabilities = heuristic_probability(series.records(), params);
            DerivedSeries::new(series, probabilities, None)
        }
        ProbabilityPolicy::TrendAdjusted(params) => {
            let split = partition(series.records(), now, forecast_horizon());
            let pressures: Vec<f64> = split.history.iter().map(|r| r.pressure).collect();
            let adjustment = estimate_pressure_trend(&pressures, params);
            let probabilities = trend_adjusted_probability(
                series.records(),
                adjustment.factor(params.neutral_factor),
                params,
            );
            DerivedSeries::new(series, probabilities, Some(adjustment))
        }
    }
}
