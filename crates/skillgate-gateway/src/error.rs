//! JSON error responses for the HTTP surface

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use skillgate_gate::GateError;
use skillgate_provider::ProviderError;
use tracing::error;

/// An error answered as `{ "success": false, "error": "..." }`
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub retry_after: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Log a failed provider call in full and answer with an opaque message.
    ///
    /// Only a malformed identifier is the caller's fault; everything else is
    /// reported as a 500.
    pub fn upstream(context: &'static str, err: &ProviderError) -> Self {
        match err {
            ProviderError::InvalidId(id) => {
                Self::bad_request(format!("Invalid identifier: {}", id))
            }
            _ => {
                error!(
                    error = %err,
                    upstream_status = ?err.status(),
                    timestamp = %chrono::Utc::now().to_rfc3339(),
                    "{}",
                    context
                );
                Self::internal(context)
            }
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
        let retry_after = match &err {
            GateError::RateLimitExceeded {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            retry_after,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response();
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
