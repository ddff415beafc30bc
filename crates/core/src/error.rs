//! Error types for the IPO watch system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the IPO watch system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetch error (network failure, timeout, retries exhausted).
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Non-success HTTP status from the feed.
    #[error("HTTP error: status {status} from {url}")]
    Http {
        /// Status code returned by the feed.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Error::Fetch(msg.into())
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, url: impl Into<String>) -> Self {
        Error::Http {
            status,
            url: url.into(),
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Whether retrying the operation could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Fetch(_) => true,
            Error::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message() {
        let err = Error::http(503, "http://localhost:5000/api/ipos");
        assert_eq!(
            err.to_string(),
            "HTTP error: status 503 from http://localhost:5000/api/ipos"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::fetch("connection refused").is_transient());
        assert!(Error::http(502, "u").is_transient());
        assert!(Error::http(429, "u").is_transient());
        assert!(!Error::http(404, "u").is_transient());
        assert!(!Error::decode("bad json").is_transient());
        assert!(!Error::config("missing url").is_transient());
    }
}
