//! Bounded retry with exponential backoff for the forecast request.
//!
//! Retried: timeouts, connection failures, 5xx, 408 and 429 responses.
//! Everything else (other 4xx, malformed requests) fails on the first attempt.

use log::{debug, info, warn};
use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BACKOFF_MS: u64 = 200;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub backoff: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BACKOFF_MS, DEFAULT_MAX_DELAY_MS)
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, backoff_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            backoff: Duration::from_millis(backoff_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Delay before retry number `retry` (0-based): `backoff * 2^retry`, capped.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry);
        let delay_ms = (self.backoff.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as u64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    NoRetry,
}

pub fn classify_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::NoRetry
    }
}

pub fn classify_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    if error.is_request() || error.is_builder() {
        return RetryDecision::NoRetry;
    }
    match error.status() {
        Some(status) => classify_status(status),
        None => RetryDecision::NoRetry,
    }
}

/// Runs `operation` until it yields a non-retryable outcome or the retry
/// budget is spent.
///
/// A retryable status on the final attempt is handed back as `Ok(response)` so
/// the caller can report the status itself.
pub async fn with_retry<F, Fut>(config: &RetryConfig, operation: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = operation().await;
        let retries_left = attempt < config.max_retries;

        match outcome {
            Ok(response) => {
                let status = response.status();
                if classify_status(status) == RetryDecision::NoRetry || !retries_left {
                    if attempt > 0 {
                        info!("Request finished with {} after {} retries", status, attempt);
                    }
                    return Ok(response);
                }
                warn!(
                    "Request returned retryable status {} (attempt {} of {})",
                    status,
                    attempt + 1,
                    config.max_retries + 1
                );
            }
            Err(e) => {
                if classify_error(&e) == RetryDecision::NoRetry {
                    debug!("Non-retryable request error: {}", e);
                    return Err(e);
                }
                if !retries_left {
                    warn!("All {} attempts failed", config.max_retries + 1);
                    return Err(e);
                }
                warn!(
                    "Retryable request error (attempt {} of {}): {}",
                    attempt + 1,
                    config.max_retries + 1,
                    e
                );
            }
        }

        let delay = config.delay_for_retry(attempt);
        debug!("Waiting {:?} before retrying", delay);
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
