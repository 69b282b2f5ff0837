//! Error types for the facade core

use thiserror::Error;

/// Result type alias for facade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Missing bearer credential")]
    MissingCredential,

    #[error("Unknown service type: {0}")]
    ServiceTypeNotFound(String),

    #[error("Plan '{plan}' not found for service type '{service_type}'")]
    PlanNotFound { service_type: String, plan: String },

    #[error("Plan '{plan}' matches {matches} entries for service type '{service_type}'")]
    AmbiguousPlan {
        service_type: String,
        plan: String,
        matches: usize,
    },

    #[error("Page {page} out of range (valid pages: 1..={num_pages})")]
    PageOutOfRange { page: usize, num_pages: usize },
}

/// Errors raised by calls to the upstream provider API.
///
/// The error payload returned by the upstream, if any, is carried verbatim so
/// the route layer can surface it to the caller.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream returned status {status}")]
    Status { status: u16, body: serde_json::Value },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_connect() {
            UpstreamError::Network("Failed to connect to upstream".to_string())
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
