//! Knowledge assistant request types.

use hub_openai::InputMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_tone() -> String {
    "neutral".to_owned()
}

/// Request payload for the knowledge assistant.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeAskRequest {
    /// Conversation so far; only the latest message is sent upstream.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub messages: Vec<InputMessage>,
    /// Restricts answers to the content of `file_ids`.
    #[serde(default)]
    pub guardrails: bool,
    /// Uploaded OpenAI file ids used as sources.
    #[serde(default)]
    #[validate(length(max = 20))]
    pub file_ids: Vec<String>,
    /// Voice of the assistant.
    #[serde(default = "default_tone")]
    #[validate(length(min = 1, max = 64))]
    pub tone: String,
    /// Model override.
    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,
}

impl KnowledgeAskRequest {
    /// Returns the content of the latest message, or an empty string.
    pub fn latest(&self) -> &str {
        self.messages
            .last()
            .map(|message| message.content.as_str())
            .unwrap_or_default()
    }

    /// Builds the system instruction.
    pub fn instructions(&self) -> String {
        format!(
            "You are a {} knowledge assistant. Cite sources inline when possible.",
            self.tone
        )
    }
}
