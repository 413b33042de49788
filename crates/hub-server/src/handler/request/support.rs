//! Support chat request types.

use hub_openai::InputMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_tone() -> String {
    "friendly".to_owned()
}

/// Request payload for the streaming support chat.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupportChatRequest {
    /// Conversation so far, oldest first.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub messages: Vec<InputMessage>,
    /// Voice of the agent.
    #[serde(default = "default_tone")]
    #[validate(length(min = 1, max = 64))]
    pub tone: String,
    /// Whether the agent may hand the conversation to a human.
    #[serde(default)]
    pub escalate: bool,
    /// Model override.
    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,
}

impl SupportChatRequest {
    /// Builds the system instruction from tone and escalation policy.
    pub fn instructions(&self) -> String {
        let policy = if self.escalate {
            "Escalate gracefully to a human when appropriate."
        } else {
            "Resolve the issue without escalation unless absolutely necessary."
        };

        format!("You are a {} support agent. {}", self.tone, policy)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_apply() {
        let request: SupportChatRequest = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": "My order is late" }]
        }))
        .unwrap();

        assert_eq!(request.tone, "friendly");
        assert!(!request.escalate);
        assert!(request.model.is_none());
        assert_eq!(
            request.instructions(),
            "You are a friendly support agent. \
             Resolve the issue without escalation unless absolutely necessary."
        );
    }

    #[test]
    fn escalation_changes_policy() {
        let request: SupportChatRequest = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": "hi" }],
            "tone": "calm",
            "escalate": true
        }))
        .unwrap();

        assert_eq!(
            request.instructions(),
            "You are a calm support agent. Escalate gracefully to a human when appropriate."
        );
    }

    #[test]
    fn empty_conversation_is_accepted() {
        let request: SupportChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.messages.is_empty());
        assert!(request.validate().is_ok());

        let request: SupportChatRequest =
            serde_json::from_value(json!({ "messages": [] })).unwrap();
        assert!(request.validate().is_ok());
    }
}
