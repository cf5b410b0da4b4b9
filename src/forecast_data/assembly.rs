//! Turns the column-oriented API response into an ordered [`HourlySeries`].

use crate::forecast_data::error::ForecastDataError;
use crate::forecast_data::response::{ForecastResponse, HourlyBlock, HourlyVariable};
use crate::types::hourly::{HourlyRecord, HourlySeries};
use chrono::{DateTime, FixedOffset};
use log::{info, warn};

/// Aligns every timestamp to `tz` and attaches each hourly variable as a field.
///
/// Hours with a missing value in any variable are skipped.
///
/// # Errors
///
/// * [`ForecastDataError::ColumnLengthMismatch`] if a variable column does not
///   have one value per timestamp.
/// * [`ForecastDataError::InvalidTimestamp`] for timestamps chrono cannot represent.
/// * [`ForecastDataError::NonMonotonicTimestamps`] if times are not strictly increasing.
/// * [`ForecastDataError::EmptySeries`] if no complete hour remains.
pub fn assemble_series(
    response: &ForecastResponse,
    tz: FixedOffset,
) -> Result<HourlySeries, ForecastDataError> {
    let hourly = &response.hourly;
    let expected = hourly.time.len();

    for variable in HourlyVariable::ALL {
        let found = hourly.column(variable).len();
        if found != expected {
            return Err(ForecastDataError::ColumnLengthMismatch {
                variable,
                expected,
                found,
            });
        }
    }

    let mut records: Vec<HourlyRecord> = Vec::with_capacity(expected);
    let mut skipped = 0usize;

    for (i, &unix) in hourly.time.iter().enumerate() {
        let time = DateTime::from_timestamp(unix, 0)
            .ok_or(ForecastDataError::InvalidTimestamp(unix))?
            .with_timezone(&tz);

        match record_at(hourly, i, time) {
            Some(record) => records.push(record),
            None => {
                warn!("Skipping {} because one or more variables are missing", time);
                skipped += 1;
            }
        }
    }

    let series = HourlySeries::try_new(records)?;
    info!(
        "Assembled {} hourly records ({} skipped) in zone {}",
        series.len(),
        skipped,
        tz
    );
    Ok(series)
}

fn record_at(
    hourly: &HourlyBlock,
    index: usize,
    time: DateTime<FixedOffset>,
) -> Option<HourlyRecord> {
    let value = |variable: HourlyVariable| hourly.column(variable)[index];
    Some(HourlyRecord {
        time,
        temperature: value(HourlyVariable::Temperature)?,
        pressure: value(HourlyVariable::SurfacePressure)?,
        rain: value(HourlyVariable::Rain)?,
        cloud_cover: value(HourlyVariable::CloudCover)?,
        humidity: value(HourlyVariable::RelativeHumidity)?,
        wind_speed: value(HourlyVariable::WindSpeed)?,
    })
}
