use crate::forecast_data::error::ForecastDataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RainMonitorError {
    #[error(transparent)]
    ForecastData(#[from] ForecastDataError),

    #[error("Failed to truncate the current time to the hour in zone {0}")]
    ClockTruncation(chrono::FixedOffset),

    #[error("Failed to write dashboard to '{0}'")]
    OutputWrite(PathBuf, #[source] std::io::Error),
}
