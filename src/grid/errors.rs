//! Grid-specific error types

use thiserror::Error;

/// Errors that can occur while planning a grid
#[derive(Error, Debug, Clone)]
pub enum GridError {
    #[error("Invalid grid parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Empty order book for {pool}: no {side} levels")]
    EmptyBook { pool: String, side: &'static str },

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// Connect failures, timeouts and 5xx responses; worth another attempt
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{what} failed after {attempts} attempts: {reason}")]
    RetriesExhausted {
        what: String,
        attempts: u32,
        reason: String,
    },

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Journal error: {0}")]
    Journal(String),
}

impl GridError {
    /// Whether repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, GridError::Transport(_))
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::JsonParse(err.to_string())
    }
}

impl From<std::io::Error> for GridError {
    fn from(err: std::io::Error) -> Self {
        GridError::Journal(err.to_string())
    }
}

impl From<reqwest::Error> for GridError {
    fn from(err: reqwest::Error) -> Self {
        let server_error = err.status().is_some_and(|s| s.is_server_error());
        if err.is_timeout() || err.is_connect() || server_error {
            GridError::Transport(err.to_string())
        } else if err.is_decode() {
            GridError::JsonParse(err.to_string())
        } else {
            GridError::Http(err.to_string())
        }
    }
}

impl From<config::ConfigError> for GridError {
    fn from(err: config::ConfigError) -> Self {
        GridError::InvalidConfig(err.to_string())
    }
}

/// Result type for grid operations
pub type GridResult<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(GridError::Transport("connection refused".into()).is_retryable());
        assert!(!GridError::Http("404 Not Found".into()).is_retryable());
        assert!(!GridError::JsonParse("expected value".into()).is_retryable());
        assert!(!GridError::Gateway("suix_queryEvents returned error -32602".into()).is_retryable());
    }

    #[test]
    fn test_retries_exhausted_message() {
        let err = GridError::RetriesExhausted {
            what: "get_pools".into(),
            attempts: 3,
            reason: "Transport error: 503".into(),
        };
        assert_eq!(
            err.to_string(),
            "get_pools failed after 3 attempts: Transport error: 503"
        );
    }
}
