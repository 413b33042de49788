//! Demo chat grounded on data from third-party connectors.
//!
//! Clients fetch connector data themselves and send it along; the hub only
//! renders it into the system instruction.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use hub_openai::{OpenAiClient, ResponseRequest};

use crate::extract::{Json, OpenAiKey, ValidateJson};
use crate::handler::Result;
use crate::handler::request::McpChatRequest;
use crate::handler::response::{ErrorResponse, McpChatReply};
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for connector chat operations.
const TRACING_TARGET: &str = "hub_server::handler::mcp";

/// Answers the conversation with connector data as context.
#[tracing::instrument(skip_all, fields(connectors = request.connectors.len()))]
async fn chat(
    State(openai): State<OpenAiClient>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<McpChatRequest>,
) -> Result<(StatusCode, Json<McpChatReply>)> {
    let instructions = request.instructions();
    let model = request
        .model
        .clone()
        .unwrap_or_else(|| config.openai_chat_model.clone());

    tracing::debug!(
        target: TRACING_TARGET,
        model = %model,
        instructions_len = instructions.len(),
        "Asking demo assistant"
    );

    let upstream_request =
        ResponseRequest::new(model, request.messages).with_instructions(instructions);
    let response = openai.create_response(&api_key, &upstream_request).await?;

    let content = response.output_text().unwrap_or_default();
    tracing::info!(target: TRACING_TARGET, answer_len = content.len(), "Demo answer produced");

    Ok((StatusCode::OK, Json(McpChatReply::new(content))))
}

fn chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Chat with connector context")
        .description(
            "Answers the conversation as a solutions engineering assistant. Data sent for \
             the `hubspot`, `salesforce`, `zendesk` and `notion` connectors is rendered \
             into the system instruction.",
        )
        .response::<200, Json<McpChatReply>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/mcp/chat", post_with(chat, chat_docs))
        .with_path_items(|item| item.tag("Connectors"))
}
