//! The end-to-end pipeline: fetch, assemble, derive, partition, render, write.

use crate::chart::document::render_document;
use crate::chart::panels::{build_chart, is_alert};
use crate::chart::ChartOptions;
use crate::config::Config;
use crate::error::RainMonitorError;
use crate::forecast_data::assembly::assemble_series;
use crate::forecast_data::client::ForecastClient;
use crate::model::{compute_probability, ProbabilityPolicy};
use crate::partition::{current_hour, forecast_horizon, partition};
use crate::types::derived::DerivedSeries;
use crate::types::meta::ForecastMeta;
use chrono::{DateTime, FixedOffset, Utc};
use log::info;
use std::fmt;
use std::path::PathBuf;

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub meta: ForecastMeta,
    pub now: DateTime<FixedOffset>,
    pub record_count: usize,
    /// Trend factor in use; `None` for the heuristic policy.
    pub trend_factor: Option<f64>,
    pub trend_degraded: bool,
    /// Highest probability inside the forecast window, if it has any records.
    pub forecast_peak: Option<f64>,
    pub alert: bool,
    pub output_path: PathBuf,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elevation = self
            .meta
            .elevation
            .map(|e| format!("{}m", e))
            .unwrap_or_else(|| "unknown".to_string());
        write!(
            f,
            "Dashboard generated for {}, {} (Elev: {})",
            self.meta.latitude, self.meta.longitude, elevation
        )
    }
}

/// Renders the HTML page and summarises the derived series.
pub fn render_dashboard(
    derived: &DerivedSeries,
    now: DateTime<FixedOffset>,
    config: &Config,
    meta: &ForecastMeta,
) -> (String, Report) {
    let split = partition(&derived.records, now, forecast_horizon());
    let options = ChartOptions {
        city_name: &config.city_name,
        meta,
        policy: &config.policy,
        trend: derived.trend.as_ref(),
    };
    let plot = build_chart(&derived.records, &split, &options);
    let html = render_document(&plot, &config.city_name, config.location);

    let neutral = match &config.policy {
        ProbabilityPolicy::TrendAdjusted(params) => params.neutral_factor,
        ProbabilityPolicy::Heuristic(_) => 1.0,
    };
    let report = Report {
        meta: meta.clone(),
        now,
        record_count: derived.records.len(),
        trend_factor: derived.trend.as_ref().map(|t| t.factor(neutral)),
        trend_degraded: derived.trend.as_ref().is_some_and(|t| t.is_degraded()),
        forecast_peak: split
            .forecast
            .iter()
            .map(|r| r.rain_probability)
            .reduce(f64::max),
        alert: is_alert(split.forecast),
        output_path: config.output_path.clone(),
    };
    (html, report)
}

/// Runs the pipeline once against the public API.
pub async fn run(config: &Config) -> Result<Report, RainMonitorError> {
    let client = ForecastClient::new(&config.cache_dir)?;
    run_with(&client, config, Utc::now()).await
}

/// Runs the pipeline with an explicit client and clock reading.
pub async fn run_with(
    client: &ForecastClient,
    config: &Config,
    instant: DateTime<Utc>,
) -> Result<Report, RainMonitorError> {
    let now = current_hour(instant, config.utc_offset)
        .ok_or(RainMonitorError::ClockTruncation(config.utc_offset))?;

    let response = client
        .hourly_forecast()
        .location(config.location)
        .call()
        .await?;
    let meta = ForecastMeta::from(&response);
    let series = assemble_series(&response, config.utc_offset)?;

    let derived = compute_probability(series, &config.policy, now);
    let (html, report) = render_dashboard(&derived, now, config, &meta);

    tokio::fs::write(&config.output_path, html)
        .await
        .map_err(|e| RainMonitorError::OutputWrite(config.output_path.clone(), e))?;
    info!(
        "Wrote {} ({} records, forecast peak {:?}, alert: {})",
        config.output_path.display(),
        report.record_count,
        report.forecast_peak,
        report.alert
    );
    Ok(report)
}
