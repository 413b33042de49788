//! Connector-grounded demo chat response types.

use hub_openai::InputMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Response of the demo chat route.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct McpChatReply {
    /// Assistant message; content is empty when the model produced none.
    pub message: InputMessage,
}

impl McpChatReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            message: InputMessage::assistant(content),
        }
    }
}
