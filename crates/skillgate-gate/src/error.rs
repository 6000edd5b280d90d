//! Error types for the request gate

use thiserror::Error;

/// Why the gate refused a request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Credential missing or not on the allow-list
    #[error("{reason}")]
    Unauthenticated {
        /// Client-facing reason
        reason: String,
    },

    /// Quota for the current window is used up
    #[error("{reason}")]
    RateLimitExceeded {
        /// Client-facing reason
        reason: String,
        /// Seconds until the window resets
        retry_after_secs: u64,
    },

    /// Request body has the wrong shape or size
    #[error("{reason}")]
    InvalidPayload {
        /// Client-facing reason
        reason: String,
    },
}

impl GateError {
    pub(crate) fn unauthenticated(reason: &str) -> Self {
        Self::Unauthenticated {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_payload(reason: &str) -> Self {
        Self::InvalidPayload {
            reason: reason.to_string(),
        }
    }

    /// HTTP status the caller should answer with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::RateLimitExceeded { .. } => 429,
            Self::InvalidPayload { .. } => 400,
        }
    }

    /// Only a rate limit clears without the client changing its request
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }

    /// Short machine-readable name, used in logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::RateLimitExceeded { .. } => "rate_limit_exceeded",
            Self::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, GateError>;
