// Remote fetcher: one HTTP GET per logical key, with a bounded timeout and a
// bounded retry policy at this boundary only

use crate::api::redact_api_key;
use crate::config::{ApiConfig, RetryConfig};
use crate::error::FetchError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// Longest slice of an error body kept in error messages
const MAX_ERROR_BODY_CHARS: usize = 256;

#[async_trait]
pub trait Fetcher: Send + Sync {
    // GET `url` and return the body; the URL already carries the api_key
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    // Counters accumulated over every fetch issued so far
    fn stats(&self) -> FetcherStats;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetcherStats {
    pub requests_sent: usize,
    pub requests_succeeded: usize,
    pub requests_failed: usize,
    pub requests_retried: usize,
    pub requests_timeout: usize,
    pub max_response_time_ms: f64,
}

pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_ms: u64,
    retry_config: RetryConfig,
    stats: Mutex<FetcherStats>,
}

impl HttpFetcher {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("airlabs-pipeline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: config.timeout_ms,
            retry_config: config.retry_config.clone(),
            stats: Mutex::new(FetcherStats::default()),
        })
    }

    // Helper to calculate exponential backoff with jitter
    pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
        let base_backoff_ms = (config.initial_backoff_ms as f64
            * config.backoff_multiplier.powf(retry_attempt as f64))
        .min(config.max_backoff_ms as f64);

        let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
        let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

        Duration::from_millis(backoff_ms as u64)
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(FetchError::ApiResponseError {
                status_code: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
                is_retryable: status.is_server_error()
                    || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
            })
        }
    }

    // reqwest errors carry the request URL, which includes the key
    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_ms)
        } else if err.is_builder() {
            FetchError::InvalidUrl(err.without_url().to_string())
        } else {
            FetchError::NetworkError(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.retry_config.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();
            self.stats.lock().requests_sent += 1;

            match self.fetch_once(url).await {
                Ok(body) => {
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    let mut stats = self.stats.lock();
                    stats.requests_succeeded += 1;
                    stats.max_response_time_ms = stats.max_response_time_ms.max(elapsed_ms);
                    debug!(url = %redact_api_key(url), attempt, bytes = body.len(), "fetched");
                    return Ok(body);
                }
                Err(err) => {
                    {
                        let mut stats = self.stats.lock();
                        if matches!(err, FetchError::Timeout(_)) {
                            stats.requests_timeout += 1;
                        }
                    }

                    if err.is_retryable() && attempt < max_attempts {
                        let backoff = Self::calculate_backoff(attempt - 1, &self.retry_config);
                        warn!(
                            url = %redact_api_key(url),
                            attempt,
                            max_attempts,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %err,
                            "fetch failed, retrying"
                        );
                        self.stats.lock().requests_retried += 1;
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    self.stats.lock().requests_failed += 1;
                    warn!(url = %redact_api_key(url), attempt, error = %err, "fetch failed");
                    return Err(err);
                }
            }
        }
    }

    fn stats(&self) -> FetcherStats {
        self.stats.lock().clone()
    }
}
