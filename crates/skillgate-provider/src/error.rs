//! Error types for provider calls

use thiserror::Error;

/// Provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level error (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error message, or the raw body
        message: String,
    },

    /// Identifier that cannot be used as a URL path segment
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Upstream status code, when the provider sent one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ProviderError>;
