//! Credential check against a configured allow-list

use crate::error::{GateError, Result};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Allow-list of opaque credentials
#[derive(Debug, Clone)]
pub struct Authenticator {
    allowed: HashSet<String>,
}

impl Authenticator {
    /// Build from the configured keys
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = keys.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            warn!("No API keys configured, every authenticated route will answer 401");
        }
        Self { allowed }
    }

    /// Number of distinct accepted keys
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.allowed.len()
    }

    /// Accept only a present, non-empty credential that is on the allow-list
    /// byte for byte.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<()> {
        debug!(
            received_key = %credential.map_or_else(|| "none".to_string(), key_preview),
            allowed_keys = self.allowed.len(),
            "Authentication attempt"
        );

        match credential {
            None | Some("") => Err(GateError::unauthenticated("API key is required")),
            Some(key) if self.allowed.contains(key) => Ok(()),
            Some(_) => Err(GateError::unauthenticated("Invalid API key")),
        }
    }
}

/// First five characters of a credential followed by `...`, for logs
#[must_use]
pub fn key_preview(key: &str) -> String {
    let prefix: String = key.chars().take(5).collect();
    format!("{prefix}...")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential() {
        let auth = Authenticator::new(["k1"]);
        let err = auth.authenticate(None).unwrap_err();
        assert_eq!(err, GateError::unauthenticated("API key is required"));
        assert!(auth.authenticate(Some("")).is_err());
    }

    #[test]
    fn test_unknown_credential() {
        let auth = Authenticator::new(["k1"]);
        let err = auth.authenticate(Some("k2")).unwrap_err();
        assert_eq!(err, GateError::unauthenticated("Invalid API key"));
    }

    #[test]
    fn test_match_is_exact() {
        let auth = Authenticator::new(["k1"]);
        assert!(auth.authenticate(Some("k1")).is_ok());
        assert!(auth.authenticate(Some("K1")).is_err());
        assert!(auth.authenticate(Some(" k1")).is_err());
        assert!(auth.authenticate(Some("k")).is_err());
    }

    #[test]
    fn test_empty_allow_list_rejects_everything() {
        let auth = Authenticator::new(Vec::<String>::new());
        assert_eq!(auth.key_count(), 0);
        assert!(auth.authenticate(Some("anything")).is_err());
    }

    #[test]
    fn test_key_preview() {
        assert_eq!(key_preview("sk-live-123456"), "sk-li...");
        assert_eq!(key_preview("ab"), "ab...");
    }
}
