// AirLabs reference data pipeline: downloads countries, airlines and routes
// and derives airline / airport IATA code lists as JSON files

pub mod airline_codes;
pub mod airports;
pub mod api;
pub mod config;
pub mod country_airlines;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod routes;
pub mod store;

// Re-export key types for convenience
pub use api::AirLabsApi;
pub use config::{ApiConfig, PipelineConfig, RetryConfig};
pub use error::{FetchError, PipelineError};
pub use fetcher::{Fetcher, FetcherStats, HttpFetcher};
pub use naming::DatasetLayout;
pub use pipeline::{Job, JobContext, JobReport, Pipeline};
pub use progress::{NoopProgress, ProgressEvent, ProgressObserver, TracingProgress};
pub use store::FileStore;
