//! Model provider client for `SkillGate`
//!
//! The gateway talks to the provider only through [`ModelProvider`], so the
//! HTTP surface can be exercised against an in-process fake.

pub mod anthropic;
pub mod config;
pub mod error;

use async_trait::async_trait;
use serde_json::Value;
use skillgate_types::{FileMetadata, MessagesRequest, ProviderSkill, UploadFile};

pub use anthropic::AnthropicClient;
pub use config::ProviderConfig;
pub use error::{ProviderError, Result};

/// Operations the gateway relays to the model provider
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Run one Messages call and return the provider's message object
    async fn create_message(&self, request: &MessagesRequest) -> Result<Value>;

    /// List uploaded files
    async fn list_files(&self) -> Result<Vec<Value>>;

    /// Fetch metadata of one file
    async fn get_file(&self, file_id: &str) -> Result<FileMetadata>;

    /// Delete one file
    async fn delete_file(&self, file_id: &str) -> Result<()>;

    /// Download the content of one file
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>>;

    /// List custom and first-party skills
    async fn list_skills(&self) -> Result<Vec<ProviderSkill>>;

    /// Fetch one skill
    async fn get_skill(&self, skill_id: &str) -> Result<Value>;

    /// Create a skill from its files; one of them must be `SKILL.md`
    async fn create_skill(
        &self,
        display_title: Option<&str>,
        files: &[UploadFile],
    ) -> Result<ProviderSkill>;

    /// Publish a new version of an existing skill from its files
    async fn create_skill_version(&self, skill_id: &str, files: &[UploadFile]) -> Result<Value>;

    /// Delete one skill
    async fn delete_skill(&self, skill_id: &str) -> Result<()>;

    /// List the versions of a skill
    async fn list_skill_versions(&self, skill_id: &str) -> Result<Vec<Value>>;

    /// Delete one version of a skill
    async fn delete_skill_version(&self, skill_id: &str, version: &str) -> Result<()>;
}
