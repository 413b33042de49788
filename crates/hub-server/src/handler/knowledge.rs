//! Knowledge assistant grounded on uploaded files.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use futures::future::join_all;
use hub_openai::{ApiKey, InputMessage, OpenAiClient, ResponseRequest};

use crate::extract::{Json, OpenAiKey, ValidateJson};
use crate::handler::request::KnowledgeAskRequest;
use crate::handler::response::{ErrorResponse, KnowledgeAnswer};
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for knowledge operations.
const TRACING_TARGET: &str = "hub_server::handler::knowledge";

/// Fetches every file and renders it as a numbered source block.
///
/// Files that cannot be fetched are kept as `[unavailable]` placeholders so
/// source numbering stays stable.
async fn collect_sources(openai: &OpenAiClient, api_key: &ApiKey, file_ids: &[String]) -> String {
    let fetches = file_ids.iter().enumerate().map(|(index, file_id)| async move {
        match openai.file_content(api_key, file_id).await {
            Ok(text) => format!("Source {} ({}):\n{}", index + 1, file_id, text),
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    file_id = %file_id,
                    error = %err,
                    "Source file unavailable"
                );
                format!("Source {} ({}): [unavailable]", index + 1, file_id)
            }
        }
    });

    join_all(fetches).await.join("\n\n")
}

/// Wraps the question with grounding instructions and its sources.
fn grounded_question(sources: &str, question: &str) -> String {
    format!(
        "Use the provided sources to answer. If the answer cannot be derived, \
         respond that the information is unavailable.\n\n{sources}\n\nQuestion: {question}"
    )
}

/// Answers the latest question, optionally restricted to file sources.
#[tracing::instrument(
    skip_all,
    fields(guardrails = request.guardrails, files = request.file_ids.len())
)]
async fn ask(
    State(openai): State<OpenAiClient>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<KnowledgeAskRequest>,
) -> Result<(StatusCode, Json<KnowledgeAnswer>)> {
    if request.guardrails && request.file_ids.is_empty() {
        return Err(ErrorKind::GuardrailsNoFiles.into_error());
    }

    let latest = request.latest();
    let question = if request.guardrails {
        let sources = collect_sources(&openai, &api_key, &request.file_ids).await;
        grounded_question(&sources, latest)
    } else {
        latest.to_owned()
    };

    let model = request
        .model
        .clone()
        .unwrap_or_else(|| config.openai_chat_model.clone());

    tracing::debug!(
        target: TRACING_TARGET,
        model = %model,
        question_len = question.len(),
        "Asking knowledge assistant"
    );

    let upstream_request = ResponseRequest::new(model, vec![InputMessage::user(question)])
        .with_instructions(request.instructions());
    let response = openai.create_response(&api_key, &upstream_request).await?;

    let answer = KnowledgeAnswer::new(response.output_text().unwrap_or_default());

    tracing::info!(
        target: TRACING_TARGET,
        answer_len = answer.message.content.len(),
        "Knowledge answer produced"
    );

    Ok((StatusCode::OK, Json(answer)))
}

fn ask_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Ask knowledge assistant")
        .description(
            "Answers the latest message. With `guardrails`, the listed files are fetched \
             and the model is instructed to answer from them only.",
        )
        .response::<200, Json<KnowledgeAnswer>>()
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
        .api_route("/knowledge/ask", post_with(ask, ask_docs))
        .with_path_items(|item| item.tag("Knowledge"))
}
