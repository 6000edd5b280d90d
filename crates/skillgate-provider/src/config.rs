//! Configuration types for the provider client

use serde::Deserialize;

/// Provider connection and fixed call parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Provider API key, normally set via `ANTHROPIC_API_KEY`
    #[serde(default)]
    pub api_key: String,

    /// API root, without the `/v1` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for every chat call
    #[serde(default = "default_model")]
    pub model: String,

    /// Output token ceiling for every chat call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Comma-separated `anthropic-beta` feature flags
    #[serde(default = "default_beta")]
    pub beta: String,

    /// `anthropic-version` header value
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_beta() -> String {
    "code-execution-2025-08-25,skills-2025-10-02,files-api-2025-04-14".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            beta: default_beta(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
