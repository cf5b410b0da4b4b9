//! Trend-adjusted policy: the base humidity/cloud score is scaled up when an
//! ARIMA model of the observed pressure predicts a fall, and down otherwise.

use crate::model::arima::fit_arima;
use crate::model::params::TrendParams;
use crate::types::hourly::HourlyRecord;
use log::{info, warn};
use thiserror::Error;

/// Reasons a pressure trend could not be estimated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    #[error("Pressure history too short: needed {needed} observations, got {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("Pressure observation at index {index} is not finite")]
    NonFiniteInput { index: usize },

    #[error("Normal equations of the pressure model are singular")]
    Singular,

    #[error("Pressure model produced a non-finite forecast")]
    NonFiniteForecast,

    #[error("Forecast horizon must be at least one step")]
    EmptyHorizon,
}

/// A successfully fitted pressure trend.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureTrend {
    pub last_observed: f64,
    /// Forecast pressure `horizon` steps after the last observation.
    pub predicted: f64,
    /// Forecast below the last observation, or every observation below its predecessor.
    pub falling: bool,
    pub factor: f64,
}

impl PressureTrend {
    pub fn is_falling(&self) -> bool {
        self.falling
    }
}

/// Every value strictly below the one before it.
pub fn is_strictly_decreasing(values: &[f64]) -> bool {
    values.len() >= 2 && values.windows(2).all(|pair| pair[1] < pair[0])
}

/// Outcome of the trend estimate. A failed fit never aborts the run; it
/// degrades to the neutral factor and keeps the reason for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum TrendAdjustment {
    Fitted(PressureTrend),
    Degraded(TrendError),
}

impl TrendAdjustment {
    pub fn factor(&self, neutral: f64) -> f64 {
        match self {
            TrendAdjustment::Fitted(trend) => trend.factor,
            TrendAdjustment::Degraded(_) => neutral,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, TrendAdjustment::Degraded(_))
    }
}

/// Fits the pressure model to `history` and turns its forecast into a
/// multiplier.
pub fn estimate_pressure_trend(history: &[f64], params: &TrendParams) -> TrendAdjustment {
    match fit_pressure_trend(history, params) {
        Ok(trend) => {
            info!(
                "Pressure {:.1} hPa now, {:.1} hPa predicted in {}h; factor {}",
                trend.last_observed, trend.predicted, params.horizon, trend.factor
            );
            TrendAdjustment::Fitted(trend)
        }
        Err(e) => {
            warn!(
                "Pressure trend unavailable ({}), using neutral factor {}",
                e, params.neutral_factor
            );
            TrendAdjustment::Degraded(e)
        }
    }
}

fn fit_pressure_trend(history: &[f64], params: &TrendParams) -> Result<PressureTrend, TrendError> {
    if params.horizon == 0 {
        return Err(TrendError::EmptyHorizon);
    }
    let fitted = fit_arima(history, params.ar_order, params.differencing)?;
    let forecast = fitted.forecast(params.horizon);

    let predicted = forecast
        .last()
        .copied()
        .ok_or(TrendError::EmptyHorizon)?;
    if !predicted.is_finite() {
        return Err(TrendError::NonFiniteForecast);
    }
    // fit_arima has already rejected an empty history.
    let last_observed = history
        .last()
        .copied()
        .ok_or(TrendError::InsufficientHistory {
            needed: 1,
            available: 0,
        })?;

    // AR on differences has no drift term, so an uneven decline can forecast
    // a rebound; an observed monotone fall always counts as falling.
    let falling = is_strictly_decreasing(history) || predicted < last_observed;
    let factor = if falling {
        params.falling_factor
    } else {
        params.steady_factor
    };
    Ok(PressureTrend {
        last_observed,
        predicted,
        falling,
        factor,
    })
}

/// Rain probability per record for a given trend factor, within `params.bounds`.
pub fn trend_adjusted_probability(
    records: &[HourlyRecord],
    factor: f64,
    params: &TrendParams,
) -> Vec<f64> {
    records
        .iter()
        .map(|r| {
            let base = r.humidity * params.humidity_weight + r.cloud_cover * params.cloud_weight;
            params.bounds.clip(base * factor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeDelta};

    fn record(hour: i64, humidity: f64, cloud_cover: f64) -> HourlyRecord {
        let start: DateTime<FixedOffset> =
            DateTime::parse_from_rfc3339("2024-05-01T00:00:00-05:00").unwrap();
        HourlyRecord {
            time: start + TimeDelta::hours(hour),
            temperature: 18.0,
            pressure: 780.0,
            rain: 0.0,
            cloud_cover,
            humidity,
            wind_speed: 5.0,
        }
    }

    #[test]
    fn test_neutral_factor_base_score() {
        let params = TrendParams::default();
        let probabilities = trend_adjusted_probability(&[record(0, 80.0, 50.0)], 1.0, &params);
        // 80*0.4 + 50*0.3
        assert!((probabilities[0] - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_degraded_uses_neutral_factor() {
        let params = TrendParams::default();
        let adjustment = estimate_pressure_trend(&[781.0, 780.0, 779.0], &params);

        assert!(adjustment.is_degraded());
        assert_eq!(
            adjustment,
            TrendAdjustment::Degraded(TrendError::InsufficientHistory {
                needed: 12,
                available: 3
            })
        );

        let records = vec![record(0, 80.0, 50.0), record(1, 95.0, 100.0)];
        let degraded =
            trend_adjusted_probability(&records, adjustment.factor(params.neutral_factor), &params);
        let neutral = trend_adjusted_probability(&records, 1.0, &params);
        assert_eq!(degraded, neutral);
    }

    #[test]
    fn test_linear_pressure_fall_raises_probability() {
        let params = TrendParams::default();
        let history: Vec<f64> = (0..24).map(|i| 785.0 - 0.3 * i as f64).collect();

        match estimate_pressure_trend(&history, &params) {
            TrendAdjustment::Fitted(trend) => {
                assert!(trend.is_falling());
                assert_eq!(trend.factor, 1.35);
            }
            TrendAdjustment::Degraded(e) => panic!("fit failed: {}", e),
        }
    }

    #[test]
    fn test_geometric_pressure_fall_raises_probability() {
        let params = TrendParams::default();
        let history: Vec<f64> = (0..24).map(|i| 775.0 + 10.0 * 0.85_f64.powi(i)).collect();

        let adjustment = estimate_pressure_trend(&history, &params);
        assert_eq!(adjustment.factor(params.neutral_factor), 1.35);
    }

    /// Small deterministic generator so the declines are irregular but repeatable.
    fn lcg(state: &mut u64) -> f64 {
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (*state >> 11) as f64 / (1u64 << 53) as f64
    }

    #[test]
    fn test_irregular_strict_declines_always_fall() {
        let params = TrendParams::default();
        for seed in 0..2000u64 {
            let mut state = seed.wrapping_add(1);
            let mut pressure = 785.0;
            let history: Vec<f64> = (0..25)
                .map(|_| {
                    let current = pressure;
                    let u = lcg(&mut state);
                    pressure -= 0.01 + 2.0 * u * u * u;
                    current
                })
                .collect();
            assert!(is_strictly_decreasing(&history));

            let adjustment = estimate_pressure_trend(&history, &params);
            assert_eq!(
                adjustment.factor(params.neutral_factor),
                1.35,
                "seed {} gave {:?}",
                seed,
                adjustment
            );
        }
    }

    #[test]
    fn test_strictly_decreasing() {
        assert!(is_strictly_decreasing(&[3.0, 2.0, 1.5]));
        assert!(!is_strictly_decreasing(&[3.0, 3.0, 1.5]));
        assert!(!is_strictly_decreasing(&[3.0, 2.0, 2.5]));
        assert!(!is_strictly_decreasing(&[3.0]));
    }

    #[test]
    fn test_rising_pressure_lowers_probability() {
        let params = TrendParams::default();
        let history: Vec<f64> = (0..24).map(|i| 778.0 + 0.2 * i as f64).collect();

        let adjustment = estimate_pressure_trend(&history, &params);
        assert_eq!(adjustment.factor(params.neutral_factor), 0.7);
    }

    #[test]
    fn test_flat_pressure_is_steady() {
        let params = TrendParams::default();
        let adjustment = estimate_pressure_trend(&[780.0; 24], &params);
        assert_eq!(adjustment.factor(params.neutral_factor), 0.7);
    }

    #[test]
    fn test_zero_horizon_degrades() {
        let params = TrendParams::builder().horizon(0).build();
        let history: Vec<f64> = (0..24).map(|i| 785.0 - 0.3 * i as f64).collect();
        assert_eq!(
            estimate_pressure_trend(&history, &params),
            TrendAdjustment::Degraded(TrendError::EmptyHorizon)
        );
    }

    #[test]
    fn test_probability_within_bounds() {
        let params = TrendParams::default();
        let records = vec![
            record(0, 100.0, 100.0),
            record(1, 0.0, 0.0),
            record(2, 60.0, 40.0),
        ];
        for factor in [0.7, 1.0, 1.35] {
            for p in trend_adjusted_probability(&records, factor, &params) {
                assert!(params.bounds.contains(p), "{} outside bounds", p);
            }
        }
        // 100*0.4 + 100*0.3 = 70, times 1.35 = 94.5
        let high = trend_adjusted_probability(&records[..1], 1.35, &params);
        assert!((high[0] - 94.5).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_humidity_clips_to_upper_bound() {
        let params = TrendParams::default();
        // (200*0.4 + 100*0.3) * 1.35 = 148.5
        let clipped = trend_adjusted_probability(&[record(0, 200.0, 100.0)], 1.35, &params);
        assert_eq!(clipped, vec![98.0]);

        let floor = trend_adjusted_probability(&[record(0, -50.0, 0.0)], 0.7, &params);
        assert_eq!(floor, vec![5.0]);
    }
}
