//! Configuration types for the request gate

use serde::Deserialize;
use std::time::Duration;

/// Gate configuration, supplied by the host application
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GateConfig {
    /// Credentials accepted in the `X-API-Key` header
    #[serde(default)]
    pub allowed_keys: Vec<String>,

    /// Length of one rate-limit window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed per identifier per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Tracked identifiers above which expired windows are swept
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,

    /// Longest accepted conversation
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Longest accepted text content of one message, in UTF-16 code units
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    10
}

fn default_sweep_threshold() -> usize {
    1000
}

fn default_max_messages() -> usize {
    50
}

fn default_max_content_chars() -> usize {
    10_000
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allowed_keys: Vec::new(),
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            sweep_threshold: default_sweep_threshold(),
            max_messages: default_max_messages(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

impl GateConfig {
    /// Rate-limit window as a [`Duration`]
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Parse a comma-separated key list, trimming entries and dropping blanks
    #[must_use]
    pub fn parse_key_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert!(config.allowed_keys.is_empty());
        assert_eq!(config.window(), Duration::from_secs(60));
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.sweep_threshold, 1000);
        assert_eq!(config.max_messages, 50);
        assert_eq!(config.max_content_chars, 10_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            allowed_keys = ["k1", "k2"]
            max_requests = 2
        "#,
        )
        .expect("Failed to parse TOML");
        assert_eq!(config.allowed_keys, vec!["k1", "k2"]);
        assert_eq!(config.max_requests, 2);
        assert_eq!(config.window_secs, 60);
    }

    #[test]
    fn test_parse_key_list() {
        assert_eq!(
            GateConfig::parse_key_list(" k1, k2 ,,k3 "),
            vec!["k1", "k2", "k3"]
        );
        assert!(GateConfig::parse_key_list("").is_empty());
    }
}
