mod chart;
mod config;
mod error;
mod forecast_data;
mod model;
mod monitor;
mod partition;
mod types;

pub use config::{default_cache_dir, Config};
pub use error::RainMonitorError;
pub use monitor::{render_dashboard, run, run_with, Report};

pub use chart::document::{escape_html, radar_embed_url, render_document};
pub use chart::panels::{build_chart, uncertainty_band, Panel};
pub use chart::ChartOptions;

pub use forecast_data::assembly::assemble_series;
pub use forecast_data::cache::ResponseCache;
pub use forecast_data::client::ForecastClient;
pub use forecast_data::error::ForecastDataError;
pub use forecast_data::response::{ForecastResponse, HourlyBlock, HourlyVariable};
pub use forecast_data::retry::RetryConfig;

pub use model::arima::{fit_arima, FittedArima};
pub use model::heuristic::heuristic_probability;
pub use model::params::{Bounds, HeuristicParams, TrendParams};
pub use model::trend::{
    estimate_pressure_trend, trend_adjusted_probability, PressureTrend, TrendAdjustment,
    TrendError,
};
pub use model::{compute_probability, ProbabilityPolicy};

pub use partition::{current_hour, forecast_horizon, partition, TimePartition, Timestamped};

pub use types::derived::{DerivedRecord, DerivedSeries};
pub use types::hourly::{HourlyRecord, HourlySeries};
pub use types::location::LatLon;
pub use types::meta::ForecastMeta;
