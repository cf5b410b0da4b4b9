//! Run configuration resolved from environment variables.
//!
//! Resolution never fails: every missing or unparsable value falls back to its
//! default, and the fallback is logged at debug level.

use crate::model::params::{HeuristicParams, TrendParams};
use crate::model::ProbabilityPolicy;
use crate::types::location::LatLon;
use chrono::{FixedOffset, Offset, Utc};
use log::debug;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_LATITUDE: f64 = 6.1239;
pub const DEFAULT_LONGITUDE: f64 = -75.3766;
pub const DEFAULT_CITY_NAME: &str = "Rionegro";
/// Colombia time, UTC-5, no daylight saving.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -5;
pub const OUTPUT_FILE_NAME: &str = "index.html";

const CACHE_DIR_NAME: &str = "rain_monitor";
const FALLBACK_CACHE_DIR: &str = ".cache";

pub const ENV_LATITUDE: &str = "CITY_LAT";
pub const ENV_LONGITUDE: &str = "CITY_LON";
pub const ENV_CITY_NAME: &str = "CITY_NAME";
pub const ENV_UTC_OFFSET: &str = "CITY_UTC_OFFSET";
pub const ENV_POLICY: &str = "RAIN_POLICY";
pub const ENV_CACHE_DIR: &str = "RAIN_CACHE_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub location: LatLon,
    pub city_name: String,
    /// Fixed zone all timestamps are displayed in.
    pub utc_offset: FixedOffset,
    pub policy: ProbabilityPolicy,
    pub cache_dir: PathBuf,
    pub output_path: PathBuf,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through an arbitrary key lookup.
    ///
    /// ```
    /// use rain_monitor::Config;
    ///
    /// let config = Config::from_lookup(|key| match key {
    ///     "CITY_LAT" => Some("4.711".to_string()),
    ///     "CITY_LON" => Some("not a number".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.location.latitude(), 4.711);
    /// assert_eq!(config.location.longitude(), -75.3766);
    /// assert_eq!(config.city_name, "Rionegro");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let latitude = parse_finite(ENV_LATITUDE, lookup(ENV_LATITUDE), DEFAULT_LATITUDE);
        let longitude = parse_finite(ENV_LONGITUDE, lookup(ENV_LONGITUDE), DEFAULT_LONGITUDE);

        let city_name = lookup(ENV_CITY_NAME)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CITY_NAME.to_string());

        let utc_offset = offset_from_hours(parse_or(
            ENV_UTC_OFFSET,
            lookup(ENV_UTC_OFFSET),
            DEFAULT_UTC_OFFSET_HOURS,
        ))
        .or_else(|| offset_from_hours(DEFAULT_UTC_OFFSET_HOURS))
        .unwrap_or_else(|| Utc.fix());

        let policy = match lookup(ENV_POLICY).as_deref().map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("heuristic") => {
                ProbabilityPolicy::Heuristic(HeuristicParams::default())
            }
            _ => ProbabilityPolicy::TrendAdjusted(TrendParams::default()),
        };

        let cache_dir = lookup(ENV_CACHE_DIR)
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        Self {
            location: LatLon(latitude, longitude),
            city_name,
            utc_offset,
            policy,
            cache_dir,
            output_path: PathBuf::from(OUTPUT_FILE_NAME),
        }
    }
}

/// Platform cache directory joined with the crate's folder name.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(text) => match text.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                debug!("Ignoring unparsable {}={:?}", key, text);
                default
            }
        },
        None => default,
    }
}

fn parse_finite(key: &str, raw: Option<String>, default: f64) -> f64 {
    let value = parse_or(key, raw, default);
    if value.is_finite() {
        value
    } else {
        debug!("Ignoring non-finite {}={}", key, value);
        default
    }
}

/// Whole hours east of UTC; only real-world offsets (-12..=14) are accepted.
fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    if (-12..=14).contains(&hours) {
        FixedOffset::east_opt(hours * 3600)
    } else {
        debug!("Ignoring out-of-range UTC offset {}", hours);
        None
    }
}
