use crate::forecast_data::response::HourlyVariable;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastDataError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read metadata for cache file '{0}'")]
    CacheMetadataRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("Invalid forecast request URL: {0}")]
    InvalidUrl(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {0}")]
    ResponseBody(String, #[source] reqwest::Error),

    #[error("Failed to parse forecast JSON")]
    JsonParse(#[from] serde_json::Error),

    #[error("Hourly column '{variable}' has {found} values, expected {expected}")]
    ColumnLengthMismatch {
        variable: HourlyVariable,
        expected: usize,
        found: usize,
    },

    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("Timestamps are not strictly increasing at record {index}")]
    NonMonotonicTimestamps { index: usize },

    #[error("Forecast response contained no usable hourly records")]
    EmptySeries,
}
