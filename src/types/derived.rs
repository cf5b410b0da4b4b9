//! Records enriched with the computed rain probability.

use crate::model::trend::TrendAdjustment;
use crate::types::hourly::{HourlyRecord, HourlySeries};
use chrono::{DateTime, FixedOffset};

/// An [`HourlyRecord`] plus its computed rain probability (percent).
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub hourly: HourlyRecord,
    pub rain_probability: f64,
}

impl DerivedRecord {
    pub fn time(&self) -> DateTime<FixedOffset> {
        self.hourly.time
    }
}

/// The full derived series together with the trend adjustment that produced it.
///
/// `trend` is `None` for the heuristic policy, which never fits a model.
#[derive(Debug)]
pub struct DerivedSeries {
    pub records: Vec<DerivedRecord>,
    pub trend: Option<TrendAdjustment>,
}

impl DerivedSeries {
    /// Zips a series with one probability per record.
    ///
    /// `probabilities` must have the same length as `series`; extra values on
    /// either side are dropped.
    pub fn new(
        series: HourlySeries,
        probabilities: Vec<f64>,
        trend: Option<TrendAdjustment>,
    ) -> Self {
        let records = series
            .into_records()
            .into_iter()
            .zip(probabilities)
            .map(|(hourly, rain_probability)| DerivedRecord {
                hourly,
                rain_probability,
            })
            .collect();
        Self { records, trend }
    }

    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.rain_probability)
    }
}
