//! Error types for prodsearch
//!
//! Covers catalog requests, configuration loading and terminal setup.

use thiserror::Error;

/// Main error type for prodsearch operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request to catalog failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network response was not ok: {status}")]
    Status { status: reqwest::StatusCode },

    #[error("Failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid catalog URL '{0}': {1}")]
    InvalidUrl(String, url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config '{path}': {source}")]
    ConfigParse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Async runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for prodsearch operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Check if a failed request is worth retrying.
    ///
    /// Transport failures and server-side statuses are retried; client errors
    /// and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Http(e) => !e.is_decode() && !e.is_builder(),
            SearchError::Status { status } => status.is_server_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = SearchError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = SearchError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("Network response was not ok"));
    }

    #[test]
    fn decode_errors_are_not_retryable() {
        let err: SearchError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(!err.is_retryable());
    }
}
