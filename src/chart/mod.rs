//! Dashboard rendering: four stacked plotly panels plus the surrounding HTML
//! page with the radar embed.

pub mod document;
pub mod panels;

use crate::chart::document::escape_html;
use crate::model::trend::TrendAdjustment;
use crate::model::ProbabilityPolicy;
use crate::types::meta::ForecastMeta;

/// Forecast peaks above this probability (percent) tint the forecast window red.
pub const ALERT_THRESHOLD: f64 = 85.0;
/// Half-width of the uncertainty band at the end of the forecast window.
pub const BAND_MAX_HALF_WIDTH: f64 = 15.0;
pub const CHART_HEIGHT: usize = 1400;
pub const CHART_DIV_ID: &str = "rain-dashboard";

pub const HISTORY_COLOR: &str = "#8c8c8c";
pub const NOW_MARKER_COLOR: &str = "yellow";
pub const BACKGROUND_COLOR: &str = "#111111";
pub const TEXT_COLOR: &str = "#f2f2f2";
pub const NOTE_COLOR: &str = "lightgray";

/// Everything the chart shows besides the series itself.
#[derive(Debug, Clone)]
pub struct ChartOptions<'a> {
    pub city_name: &'a str,
    pub meta: &'a ForecastMeta,
    pub policy: &'a ProbabilityPolicy,
    pub trend: Option<&'a TrendAdjustment>,
}

impl ChartOptions<'_> {
    /// Two-line chart title; the city name is escaped, plotly renders a
    /// subset of HTML in titles.
    pub fn title(&self) -> String {
        let elevation = match self.meta.elevation {
            Some(e) => format!("{} m", e),
            None => "unknown".to_string(),
        };
        let model = match (self.policy, self.trend) {
            (ProbabilityPolicy::TrendAdjusted(params), Some(trend)) => {
                let factor = trend.factor(params.neutral_factor);
                if trend.is_degraded() {
                    format!("{} (degraded, x{})", self.policy, factor)
                } else {
                    format!("{} (x{})", self.policy, factor)
                }
            }
            _ => self.policy.to_string(),
        };
        format!(
            "<b>SMART WEATHER STATION</b> · {}<br>\
             <span style='font-size:16px; color:cyan;'>📍 Location: {}°N, {}°E | \
             ⛰️ Elevation: {} | 🌍 Zone: {} | 🧮 Model: {}</span>",
            escape_html(self.city_name),
            self.meta.latitude,
            self.meta.longitude,
            elevation,
            escape_html(&self.meta.timezone),
            model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::TrendParams;
    use crate::model::trend::{PressureTrend, TrendError};

    fn meta() -> ForecastMeta {
        ForecastMeta {
            latitude: 6.125,
            longitude: -75.375,
            elevation: Some(2131.0),
            timezone: "GMT".to_string(),
        }
    }

    #[test]
    fn test_title_shows_location_and_factor() {
        let meta = meta();
        let policy = ProbabilityPolicy::TrendAdjusted(TrendParams::default());
        let trend = TrendAdjustment::Fitted(PressureTrend {
            last_observed: 781.0,
            predicted: 779.5,
            falling: true,
            factor: 1.35,
        });
        let options = ChartOptions {
            city_name: "Rionegro <Antioquia>",
            meta: &meta,
            policy: &policy,
            trend: Some(&trend),
        };
        let title = options.title();

        assert!(title.contains("Rionegro &lt;Antioquia&gt;"));
        assert!(title.contains("6.125°N, -75.375°E"));
        assert!(title.contains("2131 m"));
        assert!(title.contains("trend-adjusted (x1.35)"));
    }

    #[test]
    fn test_title_marks_degraded_trend() {
        let meta = ForecastMeta {
            elevation: None,
            ..meta()
        };
        let policy = ProbabilityPolicy::default();
        let trend = TrendAdjustment::Degraded(TrendError::Singular);
        let options = ChartOptions {
            city_name: "Rionegro",
            meta: &meta,
            policy: &policy,
            trend: Some(&trend),
        };
        let title = options.title();

        assert!(title.contains("Elevation: unknown"));
        assert!(title.contains("degraded, x1"));
    }
}
