use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata of a file stored with the provider.
///
/// Fields the gateway does not interpret are kept in `extra` so relaying the
/// metadata to clients loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileMetadata {
    pub fn content_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("application/octet-stream")
    }

    /// Name offered to the browser when downloading
    pub fn download_name(&self) -> String {
        match self.filename.as_deref().filter(|f| !f.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("file-{}", self.id),
        }
    }
}

/// A skill stored with the provider (custom or first-party)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSkill {
    pub id: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One file of a skill upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    /// Path relative to the skill root, e.g. `scripts/run.py`
    pub path: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(path: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    /// File name without directories
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}
