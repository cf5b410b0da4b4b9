//! Split of an ordered record set at the current local hour.

use crate::types::derived::DerivedRecord;
use crate::types::hourly::HourlyRecord;
use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};

/// Hours after "now" covered by the forecast slice.
pub const FORECAST_HORIZON_HOURS: i64 = 6;

pub fn forecast_horizon() -> TimeDelta {
    TimeDelta::hours(FORECAST_HORIZON_HOURS)
}

/// Anything carrying the timestamp a partition is computed on.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<FixedOffset>;
}

impl Timestamped for HourlyRecord {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.time
    }
}

impl Timestamped for DerivedRecord {
    fn timestamp(&self) -> DateTime<FixedOffset> {
        self.hourly.time
    }
}

/// Borrowed history and forecast views over one ordered slice.
///
/// `history` holds every record with `t <= now`; `forecast` every record with
/// `now <= t <= now + horizon`. A record stamped exactly `now` is in both.
#[derive(Debug, Clone, Copy)]
pub struct TimePartition<'a, T> {
    pub now: DateTime<FixedOffset>,
    pub horizon: TimeDelta,
    pub history: &'a [T],
    pub forecast: &'a [T],
}

impl<T> TimePartition<'_, T> {
    pub fn window_end(&self) -> DateTime<FixedOffset> {
        self.now + self.horizon
    }
}

/// Partitions `records`, which must be sorted by time, around `now`.
pub fn partition<T: Timestamped>(
    records: &[T],
    now: DateTime<FixedOffset>,
    horizon: TimeDelta,
) -> TimePartition<'_, T> {
    let end = now + horizon;
    let history_end = records.partition_point(|r| r.timestamp() <= now);
    let forecast_start = records.partition_point(|r| r.timestamp() < now);
    let forecast_end = records.partition_point(|r| r.timestamp() <= end);

    TimePartition {
        now,
        horizon,
        history: &records[..history_end],
        forecast: &records[forecast_start..forecast_end.max(forecast_start)],
    }
}

/// The hour containing `instant`, expressed in `tz`.
///
/// Returns `None` only if chrono cannot represent the truncated time.
pub fn current_hour(instant: DateTime<Utc>, tz: FixedOffset) -> Option<DateTime<FixedOffset>> {
    instant
        .with_timezone(&tz)
        .with_minute(0)?
        .with_second(0)?
        .with_nanosecond(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tz() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn record(time: DateTime<FixedOffset>) -> HourlyRecord {
        HourlyRecord {
            time,
            temperature: 18.0,
            pressure: 780.0,
            rain: 0.0,
            cloud_cover: 40.0,
            humidity: 75.0,
            wind_speed: 4.0,
        }
    }

    fn day() -> (Vec<HourlyRecord>, DateTime<FixedOffset>) {
        let start = tz().with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let records = (0..48)
            .map(|h| record(start + TimeDelta::hours(h)))
            .collect();
        (records, start + TimeDelta::hours(24))
    }

    #[test]
    fn test_partitions_overlap_only_at_now() {
        let (records, now) = day();
        let split = partition(&records, now, forecast_horizon());

        assert_eq!(split.history.len(), 25);
        assert!(split.history.iter().all(|r| r.time <= now));
        assert_eq!(split.forecast.len(), 7);
        assert_eq!(split.forecast[0].time, now);
        assert_eq!(split.forecast[6].time, split.window_end());

        let shared: Vec<_> = split
            .history
            .iter()
            .filter(|h| split.forecast.iter().any(|f| f.time == h.time))
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].time, now);
    }

    #[test]
    fn test_now_between_records() {
        let (records, now) = day();
        let now = now + TimeDelta::minutes(30);
        let split = partition(&records, now, forecast_horizon());

        assert_eq!(split.history.len(), 25);
        // Hours 25..=30 after the start fall inside the window.
        assert_eq!(split.forecast.len(), 6);
        assert!(split.forecast.iter().all(|r| r.time > now));
    }

    #[test]
    fn test_empty_forecast_past_end() {
        let (records, _) = day();
        let late = records[47].time + TimeDelta::hours(2);
        let split = partition(&records, late, forecast_horizon());

        assert_eq!(split.history.len(), 48);
        assert!(split.forecast.is_empty());
    }

    #[test]
    fn test_current_hour_truncates_in_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 22, 47, 13).unwrap()
            + TimeDelta::nanoseconds(500);
        let now = current_hour(instant, tz()).unwrap();

        assert_eq!(now.offset(), &tz());
        assert_eq!((now.hour(), now.minute(), now.second()), (17, 0, 0));
        assert_eq!(now.nanosecond(), 0);
    }
}
