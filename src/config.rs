// Pipeline configuration: where files live, how to reach the API, which keys to fetch

use crate::error::{PipelineError, Result};
use crate::naming::DatasetLayout;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://airlabs.co/api/v9";
pub const API_KEY_ENV: &str = "AIRLABS_API_KEY";

// Remote API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub retry_config: RetryConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_ms: 30_000,
            retry_config: RetryConfig::default(),
        }
    }
}

impl ApiConfig {
    // Returns the configured key or a configuration error. Fetch jobs call this
    // before issuing any request.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PipelineError::ConfigError(format!(
                "no API key configured; set {} or pass --api-key",
                API_KEY_ENV
            ))),
        }
    }
}

// Retry configuration for the fetcher
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    // Retries disabled; first failure is final
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub api: ApiConfig,
    pub layout: DatasetLayout,
    // Restricts the airline download to these country codes (input order is kept)
    pub target_countries: Option<Vec<String>>,
    // Airline code list keeps duplicates unless this is set
    pub dedup_airline_codes: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            api: ApiConfig::default(),
            layout: DatasetLayout::default(),
            target_countries: None,
            dedup_airline_codes: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api.api_key = Some(api_key.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(PipelineError::ConfigError("base URL is empty".to_string()));
        }
        if self.api.timeout_ms == 0 {
            return Err(PipelineError::ConfigError(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        let retry = &self.api.retry_config;
        if retry.backoff_multiplier < 1.0 {
            return Err(PipelineError::ConfigError(
                "backoff multiplier must be at least 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&retry.jitter_factor) {
            return Err(PipelineError::ConfigError(
                "jitter factor must be within 0.0..=1.0".to_string(),
            ));
        }
        Ok(())
    }
}
