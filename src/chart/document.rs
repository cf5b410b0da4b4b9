//! The standalone `index.html` page: chart first, radar embed below.

use crate::chart::CHART_DIV_ID;
use crate::types::location::LatLon;
use plotly::Plot;

pub const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";
const WINDY_EMBED_URL: &str = "https://embed.windy.com/embed2.html";
pub const RADAR_WIDTH: u32 = 650;
pub const RADAR_HEIGHT: u32 = 450;
const RADAR_ZOOM: u8 = 7;

/// Escapes the five characters HTML treats specially.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Windy radar embed centred on `location`.
pub fn radar_embed_url(location: LatLon) -> String {
    let (lat, lon) = (location.latitude(), location.longitude());
    format!(
        "{WINDY_EMBED_URL}?lat={lat}&lon={lon}&detailLat={lat}&detailLon={lon}\
         &width={RADAR_WIDTH}&height={RADAR_HEIGHT}&zoom={RADAR_ZOOM}\
         &level=surface&overlay=radar&product=radar&menu=&message=true&marker=true\
         &calendar=now&pressure=&type=map&location=coordinates&detail=\
         &metricWind=km%2Fh&metricTemp=%C2%B0C&radarRange=-1"
    )
}

/// Full HTML document for the dashboard.
pub fn render_document(plot: &Plot, city_name: &str, location: LatLon) -> String {
    let city = escape_html(city_name);
    // '&' must be escaped inside attribute values.
    let radar_src = escape_html(&radar_embed_url(location));
    let chart = plot.to_inline_html(Some(CHART_DIV_ID));

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Rain monitor · {city}</title>
<script src="{PLOTLY_CDN_URL}"></script>
<style>
body {{ background: #111111; color: #f2f2f2; font-family: sans-serif; margin: 0; padding: 16px; }}
.radar {{ margin: 24px auto; width: {RADAR_WIDTH}px; }}
</style>
</head>
<body>
{chart}
<section class="radar">
<h2>🛰️ Live radar · {city}</h2>
<iframe width="{RADAR_WIDTH}" height="{RADAR_HEIGHT}" src="{radar_src}" frameborder="0"></iframe>
</section>
</body>
</html>
"#
    )
}
