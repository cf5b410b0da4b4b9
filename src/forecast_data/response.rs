//! Wire model of the Open-Meteo `/v1/forecast` response.

use serde::Deserialize;
use std::fmt;

/// The hourly variables requested from the forecast API, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HourlyVariable {
    Temperature,
    SurfacePressure,
    Rain,
    CloudCover,
    RelativeHumidity,
    WindSpeed,
}

impl HourlyVariable {
    pub const ALL: [HourlyVariable; 6] = [
        HourlyVariable::Temperature,
        HourlyVariable::SurfacePressure,
        HourlyVariable::Rain,
        HourlyVariable::CloudCover,
        HourlyVariable::RelativeHumidity,
        HourlyVariable::WindSpeed,
    ];

    pub fn api_name(&self) -> &'static str {
        match self {
            HourlyVariable::Temperature => "temperature_2m",
            HourlyVariable::SurfacePressure => "surface_pressure",
            HourlyVariable::Rain => "rain",
            HourlyVariable::CloudCover => "cloud_cover",
            HourlyVariable::RelativeHumidity => "relative_humidity_2m",
            HourlyVariable::WindSpeed => "wind_speed_10m",
        }
    }

    /// Comma separated list used for the `hourly` query parameter.
    pub fn query_list() -> String {
        Self::ALL
            .iter()
            .map(HourlyVariable::api_name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for HourlyVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub hourly: HourlyBlock,
}

/// Column-oriented hourly data. `time` holds unix seconds (UTC) because the
/// request asks for `timeformat=unixtime`.
#[derive(Debug, Clone, Deserialize)]
pub struct HourlyBlock {
    pub time: Vec<i64>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub surface_pressure: Vec<Option<f64>>,
    #[serde(default)]
    pub rain: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
}

impl HourlyBlock {
    pub fn column(&self, variable: HourlyVariable) -> &[Option<f64>] {
        match variable {
            HourlyVariable::Temperature => &self.temperature_2m,
            HourlyVariable::SurfacePressure => &self.surface_pressure,
            HourlyVariable::Rain => &self.rain,
            HourlyVariable::CloudCover => &self.cloud_cover,
            HourlyVariable::RelativeHumidity => &self.relative_humidity_2m,
            HourlyVariable::WindSpeed => &self.wind_speed_10m,
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}
