//! Structured output response types.

use hub_openai::MessageRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Assistant message with its parsed JSON payload.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredMessage {
    /// Always `assistant`.
    pub role: MessageRole,
    /// Raw answer text.
    pub content: String,
    /// Parsed answer, `{}` without text, or an error object when the text is not JSON.
    pub json: Value,
}

/// Response of the structured output route.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnswer {
    pub message: StructuredMessage,
}

impl StructuredAnswer {
    /// Builds the answer from the model text, parsing it as JSON.
    pub fn from_text(text: Option<&str>) -> Self {
        let text = text.unwrap_or_default();
        let json = if text.is_empty() {
            json!({})
        } else {
            serde_json::from_str(text)
                .unwrap_or_else(|_| json!({ "error": "Failed to parse JSON", "raw": text }))
        };

        Self {
            message: StructuredMessage {
                role: MessageRole::Assistant,
                content: text.to_owned(),
                json,
            },
        }
    }
}
