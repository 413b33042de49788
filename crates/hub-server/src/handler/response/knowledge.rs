//! Knowledge assistant response types.

use hub_openai::MessageRole;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Assistant message returned by the knowledge route.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeMessage {
    /// Always `assistant`.
    pub role: MessageRole,
    /// Answer text; empty when the model produced none.
    pub content: String,
    /// Reserved for structured citations; currently always empty.
    pub citations: Vec<String>,
}

/// Response of the knowledge route.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeAnswer {
    pub message: KnowledgeMessage,
}

impl KnowledgeAnswer {
    /// Wraps the answer text in an assistant message.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: KnowledgeMessage {
                role: MessageRole::Assistant,
                content: content.into(),
                citations: Vec::new(),
            },
        }
    }
}
