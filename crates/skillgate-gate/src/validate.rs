//! Shape and size checks for chat payloads

use crate::error::{GateError, Result};
use serde_json::Value;

/// Size limits for a chat payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimits {
    /// Longest accepted conversation
    pub max_messages: usize,
    /// Longest accepted string content of one message, in UTF-16 code units
    pub max_content_chars: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            max_messages: 50,
            max_content_chars: 10_000,
        }
    }
}

/// Check a parsed chat body and return its messages.
///
/// Checks run in a fixed order and stop at the first failure: `messages`
/// must be an array, then its length is bounded, then each string `content`
/// is bounded. Length is counted in UTF-16 code units, so a character
/// outside the Basic Multilingual Plane counts twice. Structured (non-string)
/// content is not measured.
pub fn validate_payload<'a>(body: &'a Value, limits: &PayloadLimits) -> Result<&'a [Value]> {
    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| GateError::invalid_payload("Messages array is required"))?;

    if messages.len() > limits.max_messages {
        return Err(GateError::invalid_payload(
            "Too many messages in conversation",
        ));
    }

    let too_long = messages.iter().any(|msg| {
        msg.get("content")
            .and_then(Value::as_str)
            .is_some_and(|text| text.encode_utf16().count() > limits.max_content_chars)
    });
    if too_long {
        return Err(GateError::invalid_payload("Message content too long"));
    }

    Ok(messages.as_slice())
}
