//! SkillGate Types - Core types shared across the SkillGate workspace
//!
//! Skills and tools are the composition inputs; the message and provider
//! modules carry what goes over the wire to the model provider.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod message;
pub mod provider;

pub use message::MessagesRequest;
pub use provider::{FileMetadata, ProviderSkill, UploadFile};

/// Default priority for skills that do not set one
pub const DEFAULT_PRIORITY: i32 = 0;

// ============================================================================
// Tool declarations
// ============================================================================

/// Input schema of a custom function tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl InputSchema {
    pub fn object(properties: Map<String, Value>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties,
            required: None,
        }
    }

    pub fn with_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// A capability declaration handed to the model provider.
///
/// Serialized untagged so the provider sees its native shapes:
/// `{"type", "name"}` for built-ins and `{"name", "description", "input_schema"}`
/// for custom functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tool {
    /// Custom function tool with a JSON-schema input
    Custom {
        name: String,
        description: String,
        input_schema: InputSchema,
    },
    /// Reference to a provider-side executor, e.g. code execution
    BuiltIn {
        #[serde(rename = "type")]
        tool_type: String,
        name: String,
    },
}

impl Tool {
    pub fn built_in(tool_type: &str, name: &str) -> Self {
        Tool::BuiltIn {
            tool_type: tool_type.to_string(),
            name: name.to_string(),
        }
    }

    pub fn custom(name: &str, description: &str, input_schema: InputSchema) -> Self {
        Tool::Custom {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }

    /// The provider's code execution sandbox
    pub fn code_execution() -> Self {
        Self::built_in("code_execution_20250825", "code_execution")
    }

    pub fn name(&self) -> &str {
        match self {
            Tool::BuiltIn { name, .. } | Tool::Custom { name, .. } => name,
        }
    }

    /// Key used to collapse duplicate declarations: the type tag for
    /// built-ins, the function name for custom tools.
    pub fn dedup_key(&self) -> &str {
        match self {
            Tool::BuiltIn { tool_type, .. } => tool_type,
            Tool::Custom { name, .. } => name,
        }
    }
}

// ============================================================================
// Skills
// ============================================================================

/// A named, independently toggleable bundle of prompt text and tools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub system_prompt: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl Skill {
    pub fn new(id: &str, name: &str, description: &str, system_prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            enabled: true,
            system_prompt: system_prompt.to_string(),
            priority: DEFAULT_PRIORITY,
            tools: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Merged prompt and tool list derived from all enabled skills
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedConfig {
    pub system_prompt: String,
    pub tools: Vec<Tool>,
    pub enabled_skills: Vec<Skill>,
}

impl CombinedConfig {
    pub fn skill_ids(&self) -> Vec<&str> {
        self.enabled_skills.iter().map(|s| s.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dedup_key_uses_type_for_built_in() {
        let tool = Tool::code_execution();
        assert_eq!(tool.dedup_key(), "code_execution_20250825");
        assert_eq!(tool.name(), "code_execution");
    }

    #[test]
    fn test_dedup_key_uses_name_for_custom() {
        let tool = Tool::custom("lookup", "Look things up", InputSchema::object(Map::new()));
        assert_eq!(tool.dedup_key(), "lookup");
    }

    #[test]
    fn test_tool_wire_shapes() {
        let built_in = serde_json::to_value(Tool::code_execution()).unwrap();
        assert_eq!(
            built_in,
            json!({"type": "code_execution_20250825", "name": "code_execution"})
        );

        let mut props = Map::new();
        props.insert("query".into(), json!({"type": "string"}));
        let custom = Tool::custom(
            "search",
            "Search docs",
            InputSchema::object(props).with_required(["query"]),
        );
        assert_eq!(
            serde_json::to_value(custom).unwrap(),
            json!({
                "name": "search",
                "description": "Search docs",
                "input_schema": {
                    "type": "object",
                    "properties": {"query": {"type": "string"}},
                    "required": ["query"]
                }
            })
        );
    }

    #[test]
    fn test_tool_deserializes_both_variants() {
        let built_in: Tool =
            serde_json::from_value(json!({"type": "web_search_20250305", "name": "web_search"}))
                .unwrap();
        assert!(matches!(built_in, Tool::BuiltIn { .. }));

        let custom: Tool = serde_json::from_value(json!({
            "name": "calc",
            "description": "Evaluate",
            "input_schema": {"type": "object", "properties": {}}
        }))
        .unwrap();
        assert!(matches!(custom, Tool::Custom { .. }));
    }

    #[test]
    fn test_skill_defaults() {
        let skill = Skill::new("id", "Name", "Desc", "Prompt");
        assert!(skill.enabled);
        assert_eq!(skill.priority, DEFAULT_PRIORITY);
        assert!(skill.tools.is_empty());
    }
}
