use crate::forecast_data::response::ForecastResponse;

/// Location metadata as resolved by the forecast API (grid cell actually used).
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastMeta {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level, when the API reports one.
    pub elevation: Option<f64>,
    pub timezone: String,
}

impl From<&ForecastResponse> for ForecastMeta {
    fn from(response: &ForecastResponse) -> Self {
        Self {
            latitude: round4(response.latitude),
            longitude: round4(response.longitude),
            elevation: response.elevation,
            timezone: response.timezone.clone(),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
