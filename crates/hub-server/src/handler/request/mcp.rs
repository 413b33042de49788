//! Connector-grounded demo chat request types.

use hub_openai::InputMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, EnumString};
use validator::Validate;

/// Third-party systems whose data can ground a demo conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Connector {
    HubSpot,
    Salesforce,
    Zendesk,
    Notion,
}

impl Connector {
    /// Human-readable product name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::HubSpot => "HubSpot",
            Self::Salesforce => "Salesforce",
            Self::Zendesk => "Zendesk",
            Self::Notion => "Notion",
        }
    }
}

/// Data a client fetched from one connector.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorPayload {
    /// Connector id: `hubspot`, `salesforce`, `zendesk` or `notion`.
    pub id: String,
    /// Arbitrary JSON; empty values are ignored.
    #[serde(default)]
    pub data: Value,
}

/// Request payload for the connector-grounded demo chat.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct McpChatRequest {
    /// Conversation so far, oldest first.
    #[serde(default)]
    #[validate(length(max = 256))]
    pub messages: Vec<InputMessage>,
    #[serde(default)]
    #[validate(length(max = 16))]
    pub connectors: Vec<ConnectorPayload>,
    /// Model override.
    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,
}

/// Returns true for values a client sends to mean "nothing".
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Renders JSON as indented plain text for a prompt.
///
/// Arrays become `- ` lists and objects `key: value` lines; nested
/// multi-line values are indented under their key or bullet.
pub fn format_value(value: &Value, depth: usize) -> String {
    match value {
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                let formatted = format_value(entry, depth + 1);
                formatted
                    .split('\n')
                    .enumerate()
                    .map(|(index, line)| {
                        let prefix = if index == 0 { "- " } else { "  " };
                        format!("{prefix}{line}")
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, field)| {
                let formatted = format_value(field, depth + 1);
                if formatted.contains('\n') {
                    let indent = "  ".repeat(depth + 1);
                    let nested: Vec<_> = formatted
                        .split('\n')
                        .map(|line| format!("{indent}{line}"))
                        .collect();
                    format!("{key}:\n{}", nested.join("\n"))
                } else {
                    format!("{key}: {formatted}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl McpChatRequest {
    /// System instruction without connector context.
    pub const BASE_INSTRUCTIONS: &'static str =
        "You are a solutions engineering assistant guiding a product demo.";

    /// Renders one block per known connector with data, blank-line separated.
    pub fn connector_context(&self) -> String {
        self.connectors
            .iter()
            .filter(|payload| !is_empty_value(&payload.data))
            .filter_map(|payload| {
                let connector = payload.id.parse::<Connector>().ok()?;
                Some(format!(
                    "[{} Connector Data]:\n{}",
                    connector.display_name(),
                    format_value(&payload.data, 0)
                ))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Builds the system instruction, embedding connector context when present.
    pub fn instructions(&self) -> String {
        let context = self.connector_context();
        if context.is_empty() {
            Self::BASE_INSTRUCTIONS.to_owned()
        } else {
            format!(
                "{} Leverage the following connector context to answer precisely.\n\n{}",
                Self::BASE_INSTRUCTIONS,
                context
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(format_value(&json!("Acme"), 0), "Acme");
        assert_eq!(format_value(&json!(42), 0), "42");
        assert_eq!(format_value(&json!(true), 0), "true");
        assert_eq!(format_value(&Value::Null, 0), "null");
    }

    #[test]
    fn nested_values_are_indented() {
        let data = json!({
            "account": "Acme",
            "deals": [
                { "name": "Renewal", "amount": 1200 },
                "Upsell"
            ],
            "owner": { "name": "Sam", "region": "EMEA" }
        });

        let expected = [
            "account: Acme",
            "deals:",
            "  - name: Renewal",
            "    amount: 1200",
            "  - Upsell",
            "owner:",
            "  name: Sam",
            "  region: EMEA",
        ]
        .join("\n");

        assert_eq!(format_value(&data, 0), expected);
    }

    #[test]
    fn context_skips_empty_and_unknown_connectors() {
        let request: McpChatRequest = serde_json::from_value(json!({
            "connectors": [
                { "id": "hubspot", "data": { "contacts": 3 } },
                { "id": "zendesk", "data": null },
                { "id": "notion", "data": "" },
                { "id": "jira", "data": { "issues": 1 } },
                { "id": "salesforce", "data": "Pipeline is healthy" }
            ]
        }))
        .unwrap();

        assert_eq!(
            request.connector_context(),
            "[HubSpot Connector Data]:\ncontacts: 3\n\n\
             [Salesforce Connector Data]:\nPipeline is healthy"
        );
        assert!(request.instructions().starts_with(
            "You are a solutions engineering assistant guiding a product demo. \
             Leverage the following connector context to answer precisely.\n\n[HubSpot"
        ));
    }

    #[test]
    fn no_context_keeps_base_instructions() {
        let request: McpChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.messages.is_empty());
        assert_eq!(request.instructions(), McpChatRequest::BASE_INSTRUCTIONS);
    }
}
