//! Heuristic policy: weighted humidity, cloud cover and a rain flag, smoothed
//! with a centered moving average and scaled by a pressure-instability factor.

use crate::model::params::HeuristicParams;
use crate::types::hourly::HourlyRecord;

/// Unsmoothed score for one hour, clipped to `raw_bounds`.
pub fn raw_score(record: &HourlyRecord, params: &HeuristicParams) -> f64 {
    let rain_bonus = if record.rain > 0.0 {
        params.rain_bonus
    } else {
        0.0
    };
    params.raw_bounds.clip(
        record.humidity * params.humidity_weight
            + record.cloud_cover * params.cloud_weight
            + rain_bonus,
    )
}

/// Centered moving average of radius `radius`.
///
/// Positions whose full window does not fit inside the series keep their
/// unsmoothed value.
pub fn centered_moving_average(values: &[f64], radius: usize) -> Vec<f64> {
    let n = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if i < radius || i + radius >= n {
                value
            } else {
                let window = &values[i - radius..=i + radius];
                window.iter().sum::<f64>() / window.len() as f64
            }
        })
        .collect()
}

pub fn pressure_factor(pressure: f64, params: &HeuristicParams) -> f64 {
    if pressure < params.pressure_threshold {
        params.unstable_factor
    } else {
        params.stable_factor
    }
}

/// Rain probability per record under the heuristic policy, within `params.bounds`.
pub fn heuristic_probability(records: &[HourlyRecord], params: &HeuristicParams) -> Vec<f64> {
    let raw: Vec<f64> = records.iter().map(|r| raw_score(r, params)).collect();
    let smoothed = centered_moving_average(&raw, params.smoothing_radius);

    records
        .iter()
        .zip(smoothed)
        .map(|(record, score)| params.bounds.clip(score * pressure_factor(record.pressure, params)))
        .collect()
}
