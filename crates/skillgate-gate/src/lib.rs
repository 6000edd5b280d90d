//! `SkillGate` request gate
//!
//! Every proxied chat call passes three stages before it reaches the model
//! provider:
//!
//! 1. authentication against an allow-list of credentials,
//! 2. a fixed-window quota per client identifier,
//! 3. payload shape and size validation.
//!
//! Each stage can refuse the request with a [`GateError`] that maps onto an
//! HTTP status. Nothing here performs I/O; the quota map is the only shared
//! mutable state.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod ratelimit;
pub mod validate;

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub use auth::{key_preview, Authenticator};
pub use config::GateConfig;
pub use error::GateError;
pub use ratelimit::{Clock, ManualClock, RateLimiter, SystemClock};
pub use validate::{validate_payload, PayloadLimits};

/// Identifier used when a request carries neither credential nor address
pub const UNKNOWN_CLIENT: &str = "unknown";

/// One inbound request as seen by the gate
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    /// Value of the `X-API-Key` header, if any
    pub credential: Option<&'a str>,
    /// Best-known origin address of the caller
    pub client_address: &'a str,
    /// Raw request body
    pub body: &'a [u8],
}

/// A request that passed every stage
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    /// Identifier the quota was charged to
    pub client_id: String,
    /// Position of this request in the client's current window
    pub request_count: u32,
    /// Validated conversation, ready to relay
    pub messages: Vec<Value>,
}

/// Authentication, quota and validation in one pipeline
pub struct RequestGate {
    auth: Authenticator,
    limiter: RateLimiter,
    limits: PayloadLimits,
}

impl RequestGate {
    /// Build a gate on the system clock
    #[must_use]
    pub fn new(config: &GateConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a gate whose quota windows follow `clock`
    #[must_use]
    pub fn with_clock(config: &GateConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            auth: Authenticator::new(config.allowed_keys.iter().cloned()),
            limiter: RateLimiter::with_clock(
                config.window(),
                config.max_requests,
                config.sweep_threshold,
                clock,
            ),
            limits: PayloadLimits {
                max_messages: config.max_messages,
                max_content_chars: config.max_content_chars,
            },
        }
    }

    /// Stage 1 alone, for routes that are authenticated but not metered
    pub fn authenticate(&self, credential: Option<&str>) -> error::Result<()> {
        self.auth.authenticate(credential)
    }

    /// The quota tracker, exposed for inspection
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run all three stages in order, stopping at the first refusal.
    ///
    /// Quota is charged before the body is looked at, so a rejected payload
    /// still counts against the client.
    pub fn check(&self, request: &GateRequest<'_>) -> error::Result<Admission> {
        self.auth.authenticate(request.credential)?;

        let client_id = client_identifier(request.credential, request.client_address);
        let request_count = self
            .limiter
            .check(&client_id)
            .inspect_err(|_| debug!(client = %key_preview(&client_id), "Quota refused"))?;

        let body: Value = serde_json::from_slice(request.body)
            .map_err(|_| GateError::invalid_payload("Invalid JSON body"))?;
        let messages = validate_payload(&body, &self.limits)?.to_vec();

        Ok(Admission {
            client_id,
            request_count,
            messages,
        })
    }
}

/// Quota key for a request: the credential when present, else the address
#[must_use]
pub fn client_identifier(credential: Option<&str>, client_address: &str) -> String {
    match credential.filter(|c| !c.is_empty()) {
        Some(key) => key.to_string(),
        None if client_address.is_empty() => UNKNOWN_CLIENT.to_string(),
        None => client_address.to_string(),
    }
}
