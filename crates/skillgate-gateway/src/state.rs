use skillgate_gate::RequestGate;
use skillgate_provider::ModelProvider;
use skillgate_skills::{CombinedConfig, SkillRegistry};
use std::path::PathBuf;
use std::sync::Arc;

/// Fixed parameters of every outbound chat call
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub max_tokens: u32,
}

/// Shared server state
pub struct AppState {
    pub gate: RequestGate,
    pub registry: SkillRegistry,
    /// Composed once at startup; the registry never changes afterwards
    pub combined: CombinedConfig,
    pub provider: Arc<dyn ModelProvider>,
    pub chat: ChatSettings,
    /// Folder holding SKILL.md bundles for upload
    pub skills_dir: PathBuf,
}

impl AppState {
    pub fn new(
        gate: RequestGate,
        registry: SkillRegistry,
        provider: Arc<dyn ModelProvider>,
        chat: ChatSettings,
        skills_dir: PathBuf,
    ) -> Self {
        let combined = registry.compose();
        Self {
            gate,
            registry,
            combined,
            provider,
            chat,
            skills_dir,
        }
    }
}
