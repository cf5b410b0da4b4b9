use crate::chart::{
    ChartOptions, ALERT_THRESHOLD, BACKGROUND_COLOR, BAND_MAX_HALF_WIDTH, CHART_HEIGHT,
    HISTORY_COLOR, NOTE_COLOR, NOW_MARKER_COLOR, TEXT_COLOR,
};
use crate::partition::TimePartition;
use crate::types::derived::DerivedRecord;
use chrono::{DateTime, FixedOffset};
use plotly::common::{Anchor, DashType, Fill, Font, Line, Marker, Mode, Title};
use plotly::layout::{
    Annotation, Axis, GridPattern, LayoutGrid, Margin, RowOrder, Shape, ShapeLayer, ShapeLine,
    ShapeType,
};
use plotly::{Bar, Layout, Plot, Scatter};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BAND_FILL_COLOR: &str = "rgba(0, 255, 255, 0.15)";

/// One row of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Probability,
    Air,
    Pressure,
    Sky,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Probability, Panel::Air, Panel::Pressure, Panel::Sky];

    /// 1-based grid row.
    pub fn row(self) -> usize {
        match self {
            Panel::Probability => 1,
            Panel::Air => 2,
            Panel::Pressure => 3,
            Panel::Sky => 4,
        }
    }

    /// Trace axis id (`y`, `y2`, ...).
    pub fn y_axis(self) -> String {
        match self.row() {
            1 => "y".to_string(),
            n => format!("y{}", n),
        }
    }

    fn y_domain(self) -> String {
        format!("{} domain", self.y_axis())
    }

    pub fn heading(self) -> &'static str {
        match self {
            Panel::Probability => "🎯 WILL IT RAIN? (computed probability)",
            Panel::Air => "🌡️ AIR STATE (temperature and humidity)",
            Panel::Pressure => "📉 THE BAROMETER (surface pressure)",
            Panel::Sky => "☁️ THE SKY (clouds and wind)",
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            Panel::Probability => {
                "📊 <b>Probability:</b> when the cyan mountain rises, so does the risk. It never reaches 100% because of uncertainty."
            }
            Panel::Air => {
                "🌡️ <b>Air:</b> temperature in orange, humidity in blue. If they cross (temperature down, humidity up), get ready."
            }
            Panel::Pressure => {
                "📉 <b>Pressure:</b> when the red line drops below 1013 hPa the air is unstable."
            }
            Panel::Sky => {
                "☁️ <b>Sky:</b> gray bars are clouds. The white line is the wind pushing them."
            }
        }
    }

    fn axis_title(self) -> &'static str {
        match self {
            Panel::Probability => "%",
            Panel::Air => "°C / %",
            Panel::Pressure => "hPa",
            Panel::Sky => "% / km/h",
        }
    }
}

/// Formats a timestamp the way plotly reads dates, in the record's own zone.
pub fn plot_time(time: DateTime<FixedOffset>) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Lower and upper edge of the uncertainty band over the forecast
/// probabilities, or `None` for fewer than two points.
///
/// The half-width grows linearly from 0 at the first point to
/// [`BAND_MAX_HALF_WIDTH`] at the last; both edges are clipped to [0, 100].
pub fn uncertainty_band(probabilities: &[f64]) -> Option<(Vec<f64>, Vec<f64>)> {
    if probabilities.len() < 2 {
        return None;
    }
    let last = (probabilities.len() - 1) as f64;
    let (lower, upper) = probabilities
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let half_width = BAND_MAX_HALF_WIDTH * i as f64 / last;
            (
                (p - half_width).clamp(0.0, 100.0),
                (p + half_width).clamp(0.0, 100.0),
            )
        })
        .unzip();
    Some((lower, upper))
}

/// Whether the forecast window peaks above [`ALERT_THRESHOLD`].
pub fn is_alert(forecast: &[DerivedRecord]) -> bool {
    forecast
        .iter()
        .any(|r| r.rain_probability > ALERT_THRESHOLD)
}

/// A history segment and an upcoming segment of one variable.
struct Segments {
    history_x: Vec<String>,
    history_y: Vec<f64>,
    upcoming_x: Vec<String>,
    upcoming_y: Vec<f64>,
}

impl Segments {
    fn new(history: &[DerivedRecord], upcoming: &[DerivedRecord], value: fn(&DerivedRecord) -> f64) -> Self {
        Self {
            history_x: history.iter().map(|r| plot_time(r.time())).collect(),
            history_y: history.iter().map(value).collect(),
            upcoming_x: upcoming.iter().map(|r| plot_time(r.time())).collect(),
            upcoming_y: upcoming.iter().map(value).collect(),
        }
    }
}

fn line_pair(
    plot: &mut Plot,
    panel: Panel,
    segments: Segments,
    name: &str,
    accent: &'static str,
    fill: Option<Fill>,
) {
    let mut history = Scatter::new(segments.history_x, segments.history_y)
        .name(&format!("{} (observed)", name))
        .mode(Mode::Lines)
        .line(Line::new().color(HISTORY_COLOR).width(2.0))
        .y_axis(&panel.y_axis());
    let mut upcoming = Scatter::new(segments.upcoming_x, segments.upcoming_y)
        .name(name)
        .mode(Mode::Lines)
        .line(Line::new().color(accent).width(2.5))
        .y_axis(&panel.y_axis());
    if let Some(fill) = fill {
        history = history.fill(fill.clone());
        upcoming = upcoming.fill(fill);
    }
    plot.add_trace(history);
    plot.add_trace(upcoming);
}

fn probability_band(plot: &mut Plot, forecast: &[DerivedRecord]) {
    let probabilities: Vec<f64> = forecast.iter().map(|r| r.rain_probability).collect();
    let Some((lower, upper)) = uncertainty_band(&probabilities) else {
        return;
    };
    let x: Vec<String> = forecast.iter().map(|r| plot_time(r.time())).collect();
    let axis = Panel::Probability.y_axis();

    plot.add_trace(
        Scatter::new(x.clone(), lower)
            .name("Uncertainty (low)")
            .mode(Mode::Lines)
            .line(Line::new().color(BAND_FILL_COLOR).width(0.0))
            .y_axis(&axis),
    );
    plot.add_trace(
        Scatter::new(x, upper)
            .name("Uncertainty (high)")
            .mode(Mode::Lines)
            .line(Line::new().color(BAND_FILL_COLOR).width(0.0))
            .fill(Fill::ToNextY)
            .fill_color(BAND_FILL_COLOR)
            .y_axis(&axis),
    );
}

fn sky_bars(plot: &mut Plot, segments: Segments) {
    plot.add_trace(
        Bar::new(segments.history_x, segments.history_y)
            .name("Clouds (observed)")
            .marker(Marker::new().color(HISTORY_COLOR))
            .opacity(0.4)
            .y_axis(&Panel::Sky.y_axis()),
    );
    plot.add_trace(
        Bar::new(segments.upcoming_x, segments.upcoming_y)
            .name("Clouds (%)")
            .marker(Marker::new().color("lightgray"))
            .opacity(0.4)
            .y_axis(&Panel::Sky.y_axis()),
    );
}

/// "Now" marker and forecast-window rectangle for one panel.
fn panel_shapes(panel: Panel, now: &str, window_end: &str, alert: bool) -> [Shape; 2] {
    let (window_color, window_opacity) = if alert { ("red", 0.2) } else { ("white", 0.1) };
    let marker = Shape::new()
        .shape_type(ShapeType::Line)
        .x_ref("x")
        .y_ref(&panel.y_domain())
        .x0(now.to_string())
        .x1(now.to_string())
        .y0(0.0)
        .y1(1.0)
        .line(
            ShapeLine::new()
                .color(NOW_MARKER_COLOR)
                .width(2.0)
                .dash(DashType::Dash),
        );
    let window = Shape::new()
        .shape_type(ShapeType::Rect)
        .x_ref("x")
        .y_ref(&panel.y_domain())
        .x0(now.to_string())
        .x1(window_end.to_string())
        .y0(0.0)
        .y1(1.0)
        .fill_color(window_color)
        .opacity(window_opacity)
        .layer(ShapeLayer::Below)
        .line(ShapeLine::new().width(0.0));
    [marker, window]
}

/// Heading above and explanation below one panel.
fn panel_annotations(panel: Panel) -> [Annotation; 2] {
    let heading = Annotation::new()
        .x_ref("x domain")
        .y_ref(&panel.y_domain())
        .x(0.5)
        .y(1.08)
        .x_anchor(Anchor::Center)
        .text(panel.heading())
        .show_arrow(false)
        .font(Font::new().size(16).color(TEXT_COLOR));
    let explanation = Annotation::new()
        .x_ref("x domain")
        .y_ref(&panel.y_domain())
        .x(0.0)
        .y(-0.3)
        .x_anchor(Anchor::Left)
        .text(panel.explanation())
        .show_arrow(false)
        .font(Font::new().size(12).color(NOTE_COLOR));
    [heading, explanation]
}

fn layout(options: &ChartOptions<'_>, shapes: Vec<Shape>, annotations: Vec<Annotation>) -> Layout {
    let axis = |panel: Panel| Axis::new().title(Title::new(panel.axis_title()));
    Layout::new()
        .title(Title::new(&options.title()))
        .height(CHART_HEIGHT)
        .margin(Margin::new().top(120).bottom(100))
        .show_legend(false)
        .paper_background_color(BACKGROUND_COLOR)
        .plot_background_color(BACKGROUND_COLOR)
        .font(Font::new().color(TEXT_COLOR))
        .grid(
            LayoutGrid::new()
                .rows(4)
                .columns(1)
                .pattern(GridPattern::Coupled)
                .row_order(RowOrder::TopToBottom)
                .y_gap(0.35),
        )
        .y_axis(axis(Panel::Probability))
        .y_axis2(axis(Panel::Air))
        .y_axis3(axis(Panel::Pressure))
        .y_axis4(axis(Panel::Sky))
        .shapes(shapes)
        .annotations(annotations)
}

/// Builds the four-panel chart.
///
/// `records` is the full derived series; `split` must be a partition of it.
/// Everything from "now" on is drawn in the accent colors, the uncertainty
/// band and the alert tint cover the forecast window only.
pub fn build_chart(
    records: &[DerivedRecord],
    split: &TimePartition<'_, DerivedRecord>,
    options: &ChartOptions<'_>,
) -> Plot {
    let history = split.history;
    let upcoming_start = records.partition_point(|r| r.time() < split.now);
    let upcoming = &records[upcoming_start..];

    let mut plot = Plot::new();
    line_pair(
        &mut plot,
        Panel::Probability,
        Segments::new(history, upcoming, |r| r.rain_probability),
        "Probability %",
        "cyan",
        Some(Fill::ToZeroY),
    );
    probability_band(&mut plot, split.forecast);
    line_pair(
        &mut plot,
        Panel::Air,
        Segments::new(history, upcoming, |r| r.hourly.temperature),
        "Temperature (°C)",
        "orange",
        None,
    );
    line_pair(
        &mut plot,
        Panel::Air,
        Segments::new(history, upcoming, |r| r.hourly.humidity),
        "Humidity (%)",
        "dodgerblue",
        None,
    );
    line_pair(
        &mut plot,
        Panel::Pressure,
        Segments::new(history, upcoming, |r| r.hourly.pressure),
        "Pressure (hPa)",
        "red",
        None,
    );
    sky_bars(&mut plot, Segments::new(history, upcoming, |r| r.hourly.cloud_cover));
    line_pair(
        &mut plot,
        Panel::Sky,
        Segments::new(history, upcoming, |r| r.hourly.wind_speed),
        "Wind (km/h)",
        "white",
        None,
    );

    let now = plot_time(split.now);
    let window_end = plot_time(split.window_end());
    let alert = is_alert(split.forecast);
    let shapes = Panel::ALL
        .iter()
        .flat_map(|&panel| panel_shapes(panel, &now, &window_end, alert))
        .collect();
    let annotations = Panel::ALL
        .iter()
        .flat_map(|&panel| panel_annotations(panel))
        .collect();

    plot.set_layout(layout(options, shapes, annotations));
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProbabilityPolicy;
    use crate::partition::{forecast_horizon, partition};
    use crate::types::hourly::HourlyRecord;
    use crate::types::meta::ForecastMeta;
    use chrono::{TimeDelta, TimeZone};
    use serde_json::Value;

    fn records(probability: impl Fn(i64) -> f64) -> Vec<DerivedRecord> {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let start = tz.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        (0..48)
            .map(|h| DerivedRecord {
                hourly: HourlyRecord {
                    time: start + TimeDelta::hours(h),
                    temperature: 15.0 + (h % 24) as f64 / 3.0,
                    pressure: 780.0,
                    rain: 0.0,
                    cloud_cover: 60.0,
                    humidity: 85.0,
                    wind_speed: 6.0,
                },
                rain_probability: probability(h),
            })
            .collect()
    }

    fn chart_json(records: &[DerivedRecord], now_index: usize) -> Value {
        let meta = ForecastMeta {
            latitude: 6.125,
            longitude: -75.375,
            elevation: Some(2131.0),
            timezone: "GMT".to_string(),
        };
        let policy = ProbabilityPolicy::default();
        let options = ChartOptions {
            city_name: "Rionegro",
            meta: &meta,
            policy: &policy,
            trend: None,
        };
        let split = partition(records, records[now_index].time(), forecast_horizon());
        let plot = build_chart(records, &split, &options);
        serde_json::from_str(&plot.to_json()).unwrap()
    }

    fn fill_colors(json: &Value) -> Vec<String> {
        json["layout"]["shapes"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["fillcolor"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_uncertainty_band_widens_and_clips() {
        let (lower, upper) = uncertainty_band(&[50.0, 50.0, 50.0, 95.0]).unwrap();
        assert_eq!(lower, vec![50.0, 45.0, 40.0, 80.0]);
        assert_eq!(upper, vec![50.0, 55.0, 60.0, 100.0]);

        assert!(uncertainty_band(&[50.0]).is_none());
        assert!(uncertainty_band(&[]).is_none());
    }

    #[test]
    fn test_every_panel_has_marker_window_and_notes() {
        let json = chart_json(&records(|_| 40.0), 24);

        assert_eq!(json["layout"]["shapes"].as_array().unwrap().len(), 8);
        assert_eq!(json["layout"]["annotations"].as_array().unwrap().len(), 8);
        assert_eq!(json["layout"]["height"], 1400);

        let marker = &json["layout"]["shapes"][0];
        assert_eq!(marker["x0"], "2024-05-02 00:00:00");
        assert_eq!(marker["yref"], "y domain");
        let window = &json["layout"]["shapes"][1];
        assert_eq!(window["x1"], "2024-05-02 06:00:00");
        assert_eq!(json["layout"]["shapes"][7]["yref"], "y4 domain");
    }

    #[test]
    fn test_traces_and_band() {
        let json = chart_json(&records(|_| 40.0), 24);
        let data = json["data"].as_array().unwrap();

        // 5 line pairs, 2 bars and 2 band edges.
        assert_eq!(data.len(), 14);
        let observed = &data[0];
        assert_eq!(observed["x"].as_array().unwrap().len(), 25);
        let upcoming = &data[1];
        assert_eq!(upcoming["x"].as_array().unwrap().len(), 24);

        let band_high = &data[3];
        assert_eq!(band_high["fill"], "tonexty");
        assert_eq!(band_high["y"].as_array().unwrap().len(), 7);
        assert_eq!(band_high["y"][6], 55.0);
    }

    #[test]
    fn test_no_band_without_forecast() {
        let json = chart_json(&records(|_| 40.0), 47);
        assert_eq!(json["data"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn test_alert_tints_window() {
        let calm = chart_json(&records(|_| 40.0), 24);
        assert!(fill_colors(&calm).iter().all(|c| c == "white"));

        let stormy = chart_json(&records(|h| if h == 27 { 92.0 } else { 40.0 }), 24);
        let colors = fill_colors(&stormy);
        assert_eq!(colors.len(), 4);
        assert!(colors.iter().all(|c| c == "red"));
    }

    #[test]
    fn test_peak_outside_window_is_not_alert() {
        let late = chart_json(&records(|h| if h == 40 { 97.0 } else { 40.0 }), 24);
        assert!(fill_colors(&late).iter().all(|c| c == "white"));
    }
}
