//! Responses API: request types, output extraction and streaming.

use futures::Stream;
use reqwest::{Method, Response};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::client::{ApiKey, OpenAiClient, ensure_success};
use crate::stream::{RelayEvent, relay_events};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    System,
    Developer,
    User,
    Assistant,
}

/// A single role-tagged message sent as model input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct InputMessage {
    /// Author of the message.
    pub role: MessageRole,
    /// Plain text content.
    pub content: String,
}

impl InputMessage {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Body of a `POST /responses` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

impl ResponseRequest {
    /// Creates a non-streaming request.
    pub fn new(model: impl Into<String>, input: Vec<InputMessage>) -> Self {
        Self {
            model: model.into(),
            input,
            stream: false,
        }
    }

    /// Prepends a system instruction to the input.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.input.insert(0, InputMessage::system(instructions));
        self
    }

    /// Marks the request as streaming.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// A content part of an output item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// An item of the `output` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

/// The subset of a Responses API object the hub reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

impl ResponseObject {
    /// Returns the text of the first `output_text` part across all output items.
    pub fn output_text(&self) -> Option<&str> {
        self.output
            .iter()
            .flat_map(|item| item.content.iter())
            .find(|part| part.kind == "output_text")
            .and_then(|part| part.text.as_deref())
    }
}

/// An open streaming response whose status was already checked.
#[derive(Debug)]
pub struct ResponseStream {
    response: Response,
}

impl ResponseStream {
    /// Converts the upstream body into relay events.
    ///
    /// Dropping the returned stream drops the upstream body and releases the
    /// connection.
    pub fn into_events(self) -> impl Stream<Item = RelayEvent> + Send + 'static {
        relay_events(self.response.bytes_stream())
    }
}

impl OpenAiClient {
    /// Creates a response and waits for the full result.
    pub async fn create_response(
        &self,
        key: &ApiKey,
        request: &ResponseRequest,
    ) -> Result<ResponseObject> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            messages = request.input.len(),
            "Creating response"
        );

        let response = self
            .timed_request(Method::POST, "responses", key)
            .json(request)
            .send()
            .await?;

        let object = ensure_success(response).await?.json::<ResponseObject>().await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            response_id = object.id.as_deref().unwrap_or_default(),
            output_items = object.output.len(),
            "Response created"
        );

        Ok(object)
    }

    /// Opens a streaming response.
    ///
    /// A non-success upstream status is returned as [`Error::Upstream`]
    /// before any event is read, with the upstream body intact.
    ///
    /// [`Error::Upstream`]: crate::Error::Upstream
    pub async fn stream_response(
        &self,
        key: &ApiKey,
        request: &ResponseRequest,
    ) -> Result<ResponseStream> {
        let request = if request.stream {
            request.clone()
        } else {
            request.clone().streaming()
        };

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            messages = request.input.len(),
            "Opening response stream"
        );

        let response = self
            .request(Method::POST, "responses", key)
            .json(&request)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(ResponseStream { response })
    }
}
