use crate::Tool;
use serde::Serialize;
use serde_json::Value;

/// Outbound Messages API call.
///
/// `messages` is relayed as the client sent it; only the gate looks inside.
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    pub messages: Vec<Value>,
}

impl MessagesRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: String::new(),
            tools: Vec::new(),
            messages,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_tools_are_omitted() {
        let req = MessagesRequest::new("m", 10, vec![json!({"role": "user", "content": "hi"})])
            .with_system("sys");
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("tools").is_none());
        assert_eq!(value["system"], "sys");
        assert_eq!(value["max_tokens"], 10);
    }

    #[test]
    fn test_tools_serialized_when_present() {
        let req = MessagesRequest::new("m", 10, vec![]).with_tools(vec![Tool::code_execution()]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["tools"][0]["name"], "code_execution");
    }
}
