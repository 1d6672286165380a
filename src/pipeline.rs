// Orchestration: runs the four jobs individually or in sequence against one
// data directory

use crate::airline_codes::{extract_airline_codes, AirlineCodesReport};
use crate::airports::{extract_airport_codes, AirportsReport};
use crate::api::AirLabsApi;
use crate::config::PipelineConfig;
use crate::country_airlines::{fetch_country_airlines, CountryAirlinesReport};
use crate::error::{PipelineError, Result};
use crate::fetcher::{Fetcher, FetcherStats, HttpFetcher};
use crate::naming::DatasetLayout;
use crate::progress::{ProgressObserver, TracingProgress};
use crate::routes::{fetch_routes, RoutesReport};
use crate::store::FileStore;
use std::fmt;
use std::time::Instant;
use tracing::{error, info};

// What every job needs besides its own inputs
pub struct JobContext<'a> {
    pub store: &'a FileStore,
    pub layout: &'a DatasetLayout,
    pub progress: &'a dyn ProgressObserver,
}

impl<'a> JobContext<'a> {
    pub fn new(
        store: &'a FileStore,
        layout: &'a DatasetLayout,
        progress: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            store,
            layout,
            progress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    FetchAirlines,
    ExtractAirlineCodes,
    FetchRoutes,
    ExtractAirports,
}

impl Job {
    // Dependency order: each job reads what the previous one wrote
    pub const ALL: [Job; 4] = [
        Job::FetchAirlines,
        Job::ExtractAirlineCodes,
        Job::FetchRoutes,
        Job::ExtractAirports,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Job::FetchAirlines => "fetch-airlines",
            Job::ExtractAirlineCodes => "extract-airline-codes",
            Job::FetchRoutes => "fetch-routes",
            Job::ExtractAirports => "extract-airports",
        }
    }

    pub fn needs_network(&self) -> bool {
        matches!(self, Job::FetchAirlines | Job::FetchRoutes)
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobReport {
    FetchAirlines(CountryAirlinesReport),
    ExtractAirlineCodes(AirlineCodesReport),
    FetchRoutes(RoutesReport),
    ExtractAirports(AirportsReport),
}

impl JobReport {
    pub fn summary(&self) -> String {
        match self {
            JobReport::FetchAirlines(r) => {
                format!("saved airlines for {} countries", r.files.len())
            }
            JobReport::ExtractAirlineCodes(r) => format!(
                "Total (non-skipped): {}, skip count: {}, written to {}",
                r.extraction.total, r.extraction.skipped, r.output
            ),
            JobReport::FetchRoutes(r) => format!(
                "{} routes for {} airlines written to {}",
                r.routes, r.airlines, r.output
            ),
            JobReport::ExtractAirports(r) => format!(
                "{} unique airports written to {}",
                r.airports.len(),
                r.output
            ),
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    store: FileStore,
    fetcher: Box<dyn Fetcher>,
    progress: Box<dyn ProgressObserver>,
}

impl Pipeline {
    // Pipeline backed by the HTTP fetcher, logging progress through tracing.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config.api).map_err(|source| {
            PipelineError::ConfigError(format!("cannot build HTTP client: {source}"))
        })?;
        Ok(Self::with_fetcher(config, Box::new(fetcher)))
    }

    pub fn with_fetcher(config: PipelineConfig, fetcher: Box<dyn Fetcher>) -> Self {
        let store = FileStore::new(config.data_dir.clone());
        Self {
            config,
            store,
            fetcher,
            progress: Box::new(TracingProgress),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    // Request counters over every job run by this pipeline so far
    pub fn fetcher_stats(&self) -> FetcherStats {
        self.fetcher.stats()
    }

    pub async fn run(&self, job: Job) -> Result<JobReport> {
        let started = Instant::now();
        info!(job = %job, data_dir = %self.store.root().display(), "job started");

        match self.execute(job).await {
            Ok(report) => {
                info!(
                    job = %job,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "job completed: {}",
                    report.summary()
                );
                if job.needs_network() {
                    let stats = self.fetcher.stats();
                    info!(
                        job = %job,
                        requests_sent = stats.requests_sent,
                        requests_succeeded = stats.requests_succeeded,
                        requests_failed = stats.requests_failed,
                        requests_retried = stats.requests_retried,
                        requests_timeout = stats.requests_timeout,
                        max_response_time_ms = stats.max_response_time_ms,
                        "fetcher stats"
                    );
                }
                Ok(report)
            }
            Err(err) => {
                error!(job = %job, error = %err, "job aborted");
                Err(err)
            }
        }
    }

    // Runs every job in dependency order, stopping at the first failure.
    pub async fn run_all(&self) -> Result<Vec<JobReport>> {
        // Fail before any side effect if a later fetch job could not run
        if Job::ALL.iter().any(Job::needs_network) {
            self.config.api.require_api_key()?;
        }

        let mut reports = Vec::with_capacity(Job::ALL.len());
        for job in Job::ALL {
            reports.push(self.run(job).await?);
        }
        Ok(reports)
    }

    async fn execute(&self, job: Job) -> Result<JobReport> {
        let ctx = JobContext::new(&self.store, &self.config.layout, self.progress.as_ref());

        match job {
            Job::FetchAirlines => {
                let api = AirLabsApi::from_config(&self.config.api)?;
                let report = fetch_country_airlines(
                    &ctx,
                    self.fetcher.as_ref(),
                    &api,
                    self.config.target_countries.as_deref(),
                )
                .await?;
                Ok(JobReport::FetchAirlines(report))
            }
            Job::ExtractAirlineCodes => {
                let report = extract_airline_codes(&ctx, self.config.dedup_airline_codes)?;
                Ok(JobReport::ExtractAirlineCodes(report))
            }
            Job::FetchRoutes => {
                let api = AirLabsApi::from_config(&self.config.api)?;
                let report = fetch_routes(&ctx, self.fetcher.as_ref(), &api).await?;
                Ok(JobReport::FetchRoutes(report))
            }
            Job::ExtractAirports => Ok(JobReport::ExtractAirports(extract_airport_codes(&ctx)?)),
        }
    }
}
