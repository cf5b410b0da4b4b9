use crate::forecast_data::cache::ResponseCache;
use crate::forecast_data::error::ForecastDataError;
use crate::forecast_data::response::{ForecastResponse, HourlyVariable};
use crate::forecast_data::retry::{with_retry, RetryConfig};
use crate::types::location::LatLon;
use bon::bon;
use log::{debug, info, warn};
use reqwest::{Client, Url};
use std::path::Path;
use std::time::Duration;

pub const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";
const FORECAST_PATH: &str = "/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Open-Meteo hourly forecast endpoint.
///
/// Every request goes through the [`ResponseCache`] first; only cache misses
/// reach the network, and those are wrapped in [`with_retry`].
pub struct ForecastClient {
    http: Client,
    base_url: String,
    cache: ResponseCache,
    retry: RetryConfig,
}

#[bon]
impl ForecastClient {
    /// Creates a client for the public Open-Meteo API using `cache_dir` for
    /// response caching.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastDataError::ClientBuild`] if the HTTP client cannot be
    /// initialised (e.g. TLS backend failure).
    pub fn new(cache_dir: &Path) -> Result<Self, ForecastDataError> {
        Self::with_parts(
            OPEN_METEO_BASE_URL,
            ResponseCache::new(cache_dir),
            RetryConfig::default(),
        )
    }

    /// Creates a client with an explicit base URL, cache and retry policy.
    pub fn with_parts(
        base_url: &str,
        cache: ResponseCache,
        retry: RetryConfig,
    ) -> Result<Self, ForecastDataError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ForecastDataError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
            retry,
        })
    }

    /// Builds the request URL for one location.
    pub fn forecast_url(
        &self,
        location: LatLon,
        past_days: u8,
        forecast_days: u8,
    ) -> Result<Url, ForecastDataError> {
        let endpoint = format!("{}{}", self.base_url, FORECAST_PATH);
        let params = [
            ("latitude", location.latitude().to_string()),
            ("longitude", location.longitude().to_string()),
            ("hourly", HourlyVariable::query_list()),
            ("timezone", "UTC".to_string()),
            ("past_days", past_days.to_string()),
            ("forecast_days", forecast_days.to_string()),
            ("timeformat", "unixtime".to_string()),
        ];
        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| ForecastDataError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }

    /// Fetches the hourly forecast for a location.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** Coordinates to fetch.
    /// * `.past_days(u8)`: Optional. Days of past data to include. Defaults to `1`.
    /// * `.forecast_days(u8)`: Optional. Days of forecast to include. Defaults to `1`.
    ///
    /// # Errors
    ///
    /// Network failures that survive the retry budget, non-success statuses,
    /// cache I/O errors and undecodable bodies are all returned as
    /// [`ForecastDataError`]; none of them are recovered here.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use rain_monitor::{ForecastClient, LatLon};
    /// # use std::path::Path;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ForecastClient::new(Path::new(".cache"))?;
    /// let response = client
    ///     .hourly_forecast()
    ///     .location(LatLon(6.1239, -75.3766))
    ///     .call()
    ///     .await?;
    /// println!("{} hours", response.hourly.time.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn hourly_forecast(
        &self,
        location: LatLon,
        past_days: Option<u8>,
        forecast_days: Option<u8>,
    ) -> Result<ForecastResponse, ForecastDataError> {
        let url = self.forecast_url(location, past_days.unwrap_or(1), forecast_days.unwrap_or(1))?;
        let url_string = url.to_string();

        if let Some(body) = self.cache.get(&url_string).await? {
            match serde_json::from_str::<ForecastResponse>(&body) {
                Ok(response) => return Ok(response),
                Err(e) => warn!("Discarding unreadable cache entry for {}: {}", url_string, e),
            }
        } else {
            info!("Cache miss, requesting forecast for {}", location);
        }

        let body = self.download(url).await?;
        let response: ForecastResponse = serde_json::from_str(&body)?;
        self.cache.put(&url_string, &body).await?;
        Ok(response)
    }

    async fn download(&self, url: Url) -> Result<String, ForecastDataError> {
        let url_string = url.to_string();
        debug!("GET {}", url_string);

        let response = with_retry(&self.retry, || self.http.get(url.clone()).send())
            .await
            .map_err(|e| ForecastDataError::NetworkRequest(url_string.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url_string, e);
                return Err(match e.status() {
                    Some(status) => ForecastDataError::HttpStatus {
                        url: url_string,
                        status,
                        source: e,
                    },
                    None => ForecastDataError::NetworkRequest(url_string, e),
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| ForecastDataError::ResponseBody(url_string.clone(), e))?;
        info!("Downloaded {} bytes from {}", body.len(), url_string);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOCATION: LatLon = LatLon(6.1239, -75.3766);

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "latitude": 6.125,
            "longitude": -75.375,
            "elevation": 2131.0,
            "utc_offset_seconds": 0,
            "timezone": "GMT",
            "hourly": {
                "time": [1700000000, 1700003600, 1700007200],
                "temperature_2m": [17.0, 17.5, 18.1],
                "surface_pressure": [781.0, 780.6, 780.2],
                "rain": [0.0, 0.0, 0.3],
                "cloud_cover": [20, 55, 90],
                "relative_humidity_2m": [70, 80, 92],
                "wind_speed_10m": [4.0, 5.5, 7.2]
            }
        })
    }

    fn client_for(server: &MockServer, cache_dir: &Path) -> Result<ForecastClient, ForecastDataError> {
        ForecastClient::with_parts(
            &server.uri(),
            ResponseCache::new(cache_dir),
            RetryConfig::new(2, 1, 5),
        )
    }

    #[test]
    fn test_forecast_url_parameters() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let client = ForecastClient::new(dir.path())?;
        let url = client.forecast_url(LOCATION, 1, 1)?;
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/v1/forecast");
        assert!(pairs.contains(&("latitude".into(), "6.1239".into())));
        assert!(pairs.contains(&("longitude".into(), "-75.3766".into())));
        assert!(pairs.contains(&("timezone".into(), "UTC".into())));
        assert!(pairs.contains(&("past_days".into(), "1".into())));
        assert!(pairs.contains(&("forecast_days".into(), "1".into())));
        assert!(pairs.contains(&("hourly".into(), HourlyVariable::query_list())));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_then_cache_hit() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("timeformat", "unixtime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let client = client_for(&server, dir.path())?;

        let first = client.hourly_forecast().location(LOCATION).call().await?;
        let second = client.hourly_forecast().location(LOCATION).call().await?;

        assert_eq!(first.hourly.time.len(), 3);
        assert_eq!(second.hourly.time, first.hourly.time);
        assert_eq!(second.elevation, Some(2131.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_server_error_is_retried() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let client = client_for(&server, dir.path())?;
        let response = client.hourly_forecast().location(LOCATION).call().await?;

        assert_eq!(response.hourly.time.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let client = client_for(&server, dir.path())?;
        let result = client.hourly_forecast().location(LOCATION).call().await;

        match result {
            Err(ForecastDataError::HttpStatus { status, .. }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("expected HttpStatus error, got {:?}", other),
        }
        // Failed responses never reach the cache.
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let client = client_for(&server, dir.path())?;
        let result = client.hourly_forecast().location(LOCATION).call().await;

        assert!(matches!(result, Err(ForecastDataError::HttpStatus { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_refetched() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let client = client_for(&server, dir.path())?;
        let url = client.forecast_url(LOCATION, 1, 1)?.to_string();
        client.cache.put(&url, "not json").await?;

        let response = client.hourly_forecast().location(LOCATION).call().await?;
        assert_eq!(response.hourly.time.len(), 3);
        Ok(())
    }
}
