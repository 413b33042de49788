//! Structured output request types.

use hub_openai::InputMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for a schema-guided JSON answer.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StructuredRunRequest {
    /// Conversation so far, oldest first.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub messages: Vec<InputMessage>,
    /// One of `contractSummary`, `salesForecast` or `piiExtract`.
    pub schema_id: String,
    /// Switches the system prompt to the tool-using variant.
    #[serde(default)]
    pub use_tools: bool,
    /// Model override.
    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,
}
