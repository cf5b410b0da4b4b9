//! Hourly observation/forecast records as assembled from the forecast response.

use crate::forecast_data::error::ForecastDataError;
use chrono::{DateTime, FixedOffset};

/// One hour of weather data, aligned to the configured fixed time zone.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRecord {
    pub time: DateTime<FixedOffset>,
    /// Air temperature at 2 m, °C.
    pub temperature: f64,
    /// Surface pressure, hPa.
    pub pressure: f64,
    /// Rain amount for the preceding hour, mm.
    pub rain: f64,
    /// Total cloud cover, %.
    pub cloud_cover: f64,
    /// Relative humidity at 2 m, %.
    pub humidity: f64,
    /// Wind speed at 10 m, km/h.
    pub wind_speed: f64,
}

/// A chronologically ordered set of [`HourlyRecord`]s with unique timestamps.
///
/// The ordering is checked once at construction, so every consumer can rely
/// on binary searches over `time`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    records: Vec<HourlyRecord>,
}

impl HourlySeries {
    /// # Errors
    ///
    /// [`ForecastDataError::EmptySeries`] for an empty vector and
    /// [`ForecastDataError::NonMonotonicTimestamps`] when a timestamp does not
    /// strictly follow its predecessor.
    pub fn try_new(records: Vec<HourlyRecord>) -> Result<Self, ForecastDataError> {
        if records.is_empty() {
            return Err(ForecastDataError::EmptySeries);
        }
        if let Some(index) = records
            .windows(2)
            .position(|pair| pair[1].time <= pair[0].time)
        {
            return Err(ForecastDataError::NonMonotonicTimestamps { index: index + 1 });
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[HourlyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<HourlyRecord> {
        self.records
    }
}
