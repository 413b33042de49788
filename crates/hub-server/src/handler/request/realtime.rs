//! Realtime session request types.

use hub_openai::InputMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handler::{ErrorKind, Result};

/// Request payload for minting a realtime session.
///
/// Every field is optional and an unreadable body counts as empty.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeTokenRequest {
    /// Realtime model override.
    pub model: Option<String>,
    /// Session instructions.
    pub instructions: Option<String>,
}

impl RealtimeTokenRequest {
    /// Instructions used when the caller sends none.
    pub const DEFAULT_INSTRUCTIONS: &'static str = "You are a realtime assistant.";

    /// Parses a body leniently, falling back to defaults.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Returns the instructions, or the default when absent or empty.
    pub fn instructions(&self) -> &str {
        self.instructions
            .as_deref()
            .filter(|instructions| !instructions.is_empty())
            .unwrap_or(Self::DEFAULT_INSTRUCTIONS)
    }
}

fn default_respond_model() -> String {
    "gpt-4o-mini".to_owned()
}

fn default_voice() -> String {
    "verse".to_owned()
}

/// Request payload for a spoken assistant turn.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeRespondRequest {
    /// The user's turn. Required.
    pub prompt: Option<String>,
    /// Earlier turns, oldest first.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub history: Vec<InputMessage>,
    /// Text model answering the turn.
    #[serde(default = "default_respond_model")]
    #[validate(length(min = 1, max = 128))]
    pub model: String,
    /// Speech voice.
    #[serde(default = "default_voice")]
    #[validate(length(min = 1, max = 64))]
    pub voice: String,
}

impl RealtimeRespondRequest {
    /// System instruction for spoken turns.
    pub const INSTRUCTIONS: &'static str = "You are a realtime multimodal assistant. \
        Keep responses concise and reference uploaded context when provided.";

    /// Builds the model input: history followed by the prompt.
    ///
    /// A blank prompt is `invalid_prompt`.
    pub fn input(&self) -> Result<Vec<InputMessage>> {
        let prompt = self
            .prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
            .ok_or_else(|| ErrorKind::InvalidPrompt.with_message("Prompt is required."))?;

        let mut input = self.history.clone();
        input.push(InputMessage::user(prompt));
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn respond_defaults_apply() {
        let request: RealtimeRespondRequest = serde_json::from_value(json!({
            "prompt": "What did I upload?",
            "history": [{ "role": "assistant", "content": "Hi" }]
        }))
        .unwrap();

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.voice, "verse");

        let input = request.input().unwrap();
        assert_eq!(input.len(), 2);
        assert_eq!(input[1], InputMessage::user("What did I upload?"));
    }

    #[test]
    fn respond_requires_a_prompt() {
        let request: RealtimeRespondRequest =
            serde_json::from_value(json!({ "prompt": "  " })).unwrap();
        assert_eq!(request.input().unwrap_err().kind(), ErrorKind::InvalidPrompt);

        let request: RealtimeRespondRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.input().is_err());
    }

    #[test]
    fn unreadable_body_uses_defaults() {
        let request = RealtimeTokenRequest::from_body(b"not json");
        assert!(request.model.is_none());
        assert_eq!(request.instructions(), RealtimeTokenRequest::DEFAULT_INSTRUCTIONS);

        let request = RealtimeTokenRequest::from_body(b"");
        assert_eq!(request.instructions(), RealtimeTokenRequest::DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn supplied_fields_are_kept() {
        let request = RealtimeTokenRequest::from_body(
            br#"{"model":"gpt-4o-mini-realtime-preview","instructions":"Speak slowly."}"#,
        );
        assert_eq!(request.model.as_deref(), Some("gpt-4o-mini-realtime-preview"));
        assert_eq!(request.instructions(), "Speak slowly.");
    }
}
