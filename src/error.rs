// Error types shared by the fetcher, the file store and the jobs

use std::path::PathBuf;
use thiserror::Error;

// Failures at the remote fetch boundary
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError {
        status_code: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl FetchError {
    // Whether another attempt could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::NetworkError(_) | FetchError::Timeout(_) => true,
            FetchError::ApiResponseError { is_retryable, .. } => *is_retryable,
            FetchError::InvalidUrl(_) | FetchError::ClientError(_) => false,
        }
    }
}

// Job level failures. Only MissingField is ever recovered locally
// (airline code extraction skips and counts it); everything else aborts the job.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Missing required field `{field}` in {context}")]
    MissingField { field: String, context: String },

    #[error("Fetch failed for {key}: {source}")]
    FetchError {
        key: String,
        #[source]
        source: FetchError,
    },

    #[error("JSON parse error in {context}: {message}")]
    JsonParseError { context: String, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote API reported an error for {key}: {message}")]
    ApiError { key: String, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::IoError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(context: impl Into<String>, err: &serde_json::Error) -> Self {
        PipelineError::JsonParseError {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(FetchError::NetworkError("reset".into()), true ; "network")]
    #[test_case(FetchError::Timeout(100), true ; "timeout")]
    #[test_case(FetchError::InvalidUrl("::".into()), false ; "invalid url")]
    #[test_case(FetchError::ApiResponseError { status_code: 503, message: String::new(), is_retryable: true }, true ; "server error")]
    #[test_case(FetchError::ApiResponseError { status_code: 404, message: String::new(), is_retryable: false }, false ; "not found")]
    fn test_fetch_error_retryability(err: FetchError, expected: bool) {
        assert_eq!(err.is_retryable(), expected);
    }

    #[test]
    fn test_io_error_message_names_path() {
        let err = PipelineError::io(
            "data/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let message = err.to_string();
        assert!(message.contains("data/missing.json"));
        assert!(message.contains("no such file"));
    }
}
