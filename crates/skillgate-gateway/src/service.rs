use crate::config::Config;
use crate::routes::build_router;
use crate::state::{AppState, ChatSettings};
use anyhow::{Context, Result};
use skillgate_gate::RequestGate;
use skillgate_logging::LogFormat;
use skillgate_provider::AnthropicClient;
use skillgate_skills::SkillRegistry;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// Gateway service - main orchestrator
pub struct GatewayService {
    config: Config,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the shared state from config
    pub fn build_state(&self) -> Result<AppState> {
        let registry = SkillRegistry::builtin().with_disabled(&self.config.skills.disabled);

        let gate_config = &self.config.gate;
        let gate = RequestGate::new(gate_config);
        info!(
            "Request gate: {} keys, {} requests per {}s, {} messages max, {} chars max",
            gate_config.allowed_keys.len(),
            gate_config.max_requests,
            gate_config.window_secs,
            gate_config.max_messages,
            gate_config.max_content_chars
        );

        let provider = AnthropicClient::new(&self.config.provider)
            .context("Failed to initialize provider client")?;

        let chat = ChatSettings {
            model: self.config.provider.model.clone(),
            max_tokens: self.config.provider.max_tokens,
        };

        Ok(AppState::new(
            gate,
            registry,
            Arc::new(provider),
            chat,
            self.config.skills.directory_path(),
        ))
    }

    /// Run the gateway service
    pub async fn run(self) -> Result<()> {
        // Initialize logging
        skillgate_logging::init_logging(
            &self.config.logging.level,
            LogFormat::from_config(&self.config.logging.format),
        )?;
        info!("Starting SkillGate Gateway Service");

        let state = Arc::new(self.build_state()?);
        info!(
            "Composed {} enabled skills into {} tools",
            state.combined.enabled_skills.len(),
            state.combined.tools.len()
        );

        let app = build_router(state, self.config.server.cors);

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("Listening on http://{}", addr);

        // Setup signal handler for graceful shutdown
        let shutdown = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
            info!("Received shutdown signal, shutting down gracefully...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        info!("Gateway service stopped");
        Ok(())
    }
}
