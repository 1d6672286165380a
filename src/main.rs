//! `airlabs-pipeline` command-line entry point.
//!
//! Each subcommand runs one job against the data directory; `all` runs the four
//! jobs in order. The API key is read from `AIRLABS_API_KEY` unless passed
//! with `--api-key`.

use airlabs_pipeline::config::{API_KEY_ENV, DEFAULT_BASE_URL};
use airlabs_pipeline::{Job, Pipeline, PipelineConfig, RetryConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Download AirLabs reference data and derive IATA code lists.
#[derive(Debug, Parser)]
#[command(name = "airlabs-pipeline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the input and output JSON files.
    #[arg(long, env = "AIRLABS_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// AirLabs API key.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL.
    #[arg(long, env = "AIRLABS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Retries per request after the first attempt.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download one airlines document per country.
    FetchAirlines {
        /// Only fetch these country codes (repeatable).
        #[arg(long = "country")]
        countries: Vec<String>,
    },
    /// Collect airline IATA codes from the downloaded airlines documents.
    ExtractAirlineCodes {
        /// Drop repeated codes, keeping the first occurrence.
        #[arg(long)]
        dedup: bool,
    },
    /// Download the routes of every extracted airline code.
    FetchRoutes,
    /// Collect unique airport IATA codes from the downloaded routes.
    ExtractAirports,
    /// Run all four jobs in order.
    All {
        /// Only fetch these country codes (repeatable).
        #[arg(long = "country")]
        countries: Vec<String>,
        /// Drop repeated airline codes before fetching routes.
        #[arg(long)]
        dedup: bool,
    },
}

impl Cli {
    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default().with_data_dir(self.data_dir.clone());
        config.api.api_key = self.api_key.clone();
        config.api.base_url = self.base_url.clone();
        config.api.timeout_ms = self.timeout_ms;
        config.api.retry_config = RetryConfig {
            max_retries: self.max_retries,
            ..RetryConfig::default()
        };

        match &self.command {
            Commands::FetchAirlines { countries } | Commands::All { countries, .. }
                if !countries.is_empty() =>
            {
                config.target_countries = Some(countries.clone());
            }
            _ => {}
        }
        if let Commands::ExtractAirlineCodes { dedup } | Commands::All { dedup, .. } =
            &self.command
        {
            config.dedup_airline_codes = *dedup;
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let pipeline = Pipeline::new(cli.config()).context("failed to set up pipeline")?;

    // Jobs are strictly sequential, a single-threaded runtime is enough
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let reports = match cli.command {
            Commands::FetchAirlines { .. } => vec![pipeline.run(Job::FetchAirlines).await?],
            Commands::ExtractAirlineCodes { .. } => {
                vec![pipeline.run(Job::ExtractAirlineCodes).await?]
            }
            Commands::FetchRoutes => vec![pipeline.run(Job::FetchRoutes).await?],
            Commands::ExtractAirports => vec![pipeline.run(Job::ExtractAirports).await?],
            Commands::All { .. } => pipeline.run_all().await?,
        };

        for report in &reports {
            println!("{}", report.summary());
        }
        let stats = pipeline.fetcher_stats();
        if stats.requests_sent > 0 {
            println!(
                "requests: {} sent, {} succeeded, {} retried, {} failed",
                stats.requests_sent,
                stats.requests_succeeded,
                stats.requests_retried,
                stats.requests_failed
            );
        }
        Ok::<(), anyhow::Error>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_maps_to_config() {
        let cli = Cli::try_parse_from([
            "airlabs-pipeline",
            "--data-dir",
            "/tmp/airlabs",
            "--api-key",
            "k",
            "--max-retries",
            "1",
            "all",
            "--country",
            "DE",
            "--country",
            "FR",
            "--dedup",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/airlabs"));
        assert_eq!(config.api.api_key.as_deref(), Some("k"));
        assert_eq!(config.api.retry_config.max_retries, 1);
        assert_eq!(
            config.target_countries,
            Some(vec!["DE".to_string(), "FR".to_string()])
        );
        assert!(config.dedup_airline_codes);
    }

    #[test]
    fn test_single_job_defaults() {
        let cli = Cli::try_parse_from(["airlabs-pipeline", "--api-key", "k", "extract-airports"])
            .unwrap();
        let config = cli.config();
        assert!(config.target_countries.is_none());
        assert!(!config.dedup_airline_codes);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }
}
