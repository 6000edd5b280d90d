use serde::Deserialize;
use skillgate_gate::GateConfig;
use skillgate_provider::ProviderConfig;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000
cors = false

[provider]
api_key = ""  # Set via ANTHROPIC_API_KEY env var
base_url = "https://api.anthropic.com"
model = "claude-haiku-4-5-20251001"
max_tokens = 1000
beta = "code-execution-2025-08-25,skills-2025-10-02,files-api-2025-04-14"

[gate]
allowed_keys = []  # Set via ALLOWED_API_KEYS env var (comma-separated)
window_secs = 60
max_requests = 10
sweep_threshold = 1000
max_messages = 50
max_content_chars = 10000

[skills]
directory = "skills"  # Set via SKILLS_DIRECTORY env var
disabled = []

[logging]
level = "info"  # trace, debug, info, warn, error
format = "pretty"  # pretty or json
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SkillsConfig {
    /// Folder holding SKILL.md bundles for upload
    #[serde(default = "default_skills_directory")]
    pub directory: String,
    /// Built-in skill ids switched off at startup
    #[serde(default)]
    pub disabled: Vec<String>,
}

fn default_skills_directory() -> String {
    "skills".to_string()
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            directory: default_skills_directory(),
            disabled: Vec::new(),
        }
    }
}

impl SkillsConfig {
    /// Bundle directory with a leading `~` expanded
    pub fn directory_path(&self) -> PathBuf {
        expand_home(&self.directory)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.skillgate/skillgate.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".skillgate").join("skillgate.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<Option<PathBuf>> {
        let Some(config_path) = Self::global_config_path() else {
            eprintln!("Could not find home directory, skipping global config");
            return Ok(None);
        };

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
            eprintln!("Please edit this file or set environment variables.");
        }

        Ok(Some(config_path))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.skillgate/skillgate.toml (auto-created if missing)
    /// 2. Local override: ./skillgate.toml (workspace, optional)
    /// 3. Environment variables with SKILLGATE__ prefix
    /// 4. Convenience variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder();

        // Layer 1: Global config
        if let Some(global_config_path) = Self::ensure_global_config()? {
            config_builder = config_builder.add_source(config::File::from(global_config_path));
        }

        config_builder = config_builder
            // Layer 2: Local workspace config (optional override)
            .add_source(config::File::with_name("skillgate").required(false))
            // Layer 3: Environment variables with SKILLGATE__ prefix
            .add_source(config::Environment::with_prefix("SKILLGATE").separator("__"));

        // Layer 4: Apply convenience env var overrides (highest priority)
        if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
            config_builder = config_builder.set_override("provider.api_key", key)?;
        }

        if let Ok(url) = env::var("ANTHROPIC_BASE_URL") {
            config_builder = config_builder.set_override("provider.base_url", url)?;
        }

        if let Ok(keys) = env::var("ALLOWED_API_KEYS") {
            config_builder = config_builder
                .set_override("gate.allowed_keys", GateConfig::parse_key_list(&keys))?;
        }

        if let Ok(dir) = env::var("SKILLS_DIRECTORY") {
            config_builder = config_builder.set_override("skills.directory", dir)?;
        }

        let config = config_builder.build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(source: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_matches_defaults() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.gate, GateConfig::default());
        assert_eq!(config.skills.directory, "skills");
        assert!(config.skills.disabled.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml(
            r#"
            [gate]
            allowed_keys = ["k1"]
            max_requests = 2

            [skills]
            disabled = ["web-dev"]
        "#,
        )
        .unwrap();
        assert_eq!(config.gate.allowed_keys, vec!["k1"]);
        assert_eq!(config.gate.max_requests, 2);
        assert_eq!(config.gate.window_secs, 60);
        assert_eq!(config.skills.disabled, vec!["web-dev"]);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("skills"), PathBuf::from("skills"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/skills"), home.join("skills"));
        }
    }
}
