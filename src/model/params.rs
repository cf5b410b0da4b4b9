//! Tunable constants of the rain-probability policies.
//!
//! Every weight, threshold and clip bound lives here with its default, so the
//! policies themselves contain no magic numbers.

use bon::Builder;

/// Closed interval used to clip a probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    /// Endpoints given in the wrong order are swapped.
    pub fn new(a: f64, b: f64) -> Self {
        if b < a {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Never panics; a NaN endpoint is ignored and a NaN value maps to `min`.
    pub fn clip(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Parameters of the humidity/cloud/rain-flag heuristic.
///
/// ```
/// use rain_monitor::HeuristicParams;
///
/// let params = HeuristicParams::builder().rain_bonus(30.0).build();
/// assert_eq!(params.rain_bonus, 30.0);
/// assert_eq!(params.humidity_weight, 0.3);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct HeuristicParams {
    #[builder(default = 0.3)]
    pub humidity_weight: f64,
    #[builder(default = 0.3)]
    pub cloud_weight: f64,
    /// Points added when any rain is reported for the hour.
    #[builder(default = 40.0)]
    pub rain_bonus: f64,
    /// Clip applied to the raw score before smoothing.
    #[builder(default = Bounds::new(0.0, 100.0))]
    pub raw_bounds: Bounds,
    /// Half-width of the centered moving average, in hours.
    #[builder(default = 1)]
    pub smoothing_radius: usize,
    /// Pressure (hPa) below which the air is treated as unstable.
    #[builder(default = 1013.0)]
    pub pressure_threshold: f64,
    #[builder(default = 1.2)]
    pub unstable_factor: f64,
    #[builder(default = 0.8)]
    pub stable_factor: f64,
    #[builder(default = Bounds::new(5.0, 95.0))]
    pub bounds: Bounds,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Parameters of the pressure-trend-adjusted policy.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct TrendParams {
    #[builder(default = 0.4)]
    pub humidity_weight: f64,
    #[builder(default = 0.3)]
    pub cloud_weight: f64,
    /// Autoregressive order `p` of the ARIMA(p, d, 0) pressure model.
    #[builder(default = 5)]
    pub ar_order: usize,
    /// Differencing order `d`.
    #[builder(default = 1)]
    pub differencing: usize,
    /// Forecast steps (hours) ahead that decide the trend.
    #[builder(default = 6)]
    pub horizon: usize,
    /// Multiplier when pressure is predicted to fall.
    #[builder(default = 1.35)]
    pub falling_factor: f64,
    /// Multiplier when pressure is predicted to hold or rise.
    #[builder(default = 0.7)]
    pub steady_factor: f64,
    /// Multiplier used when no model could be fitted.
    #[builder(default = 1.0)]
    pub neutral_factor: f64,
    #[builder(default = Bounds::new(5.0, 98.0))]
    pub bounds: Bounds,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self::builder().build()
    }
}
