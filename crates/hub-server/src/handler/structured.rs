//! Schema-guided JSON answers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use hub_openai::{OpenAiClient, ResponseRequest};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString, VariantNames};

use crate::extract::{Json, OpenAiKey, ValidateJson};
use crate::handler::request::StructuredRunRequest;
use crate::handler::response::{ErrorResponse, StructuredAnswer};
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for structured output operations.
const TRACING_TARGET: &str = "hub_server::handler::structured";

/// JSON schemas the model can be asked to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(AsRefStr, Display, EnumString, VariantNames)]
#[strum(serialize_all = "camelCase")]
pub enum StructuredSchema {
    ContractSummary,
    SalesForecast,
    PiiExtract,
}

impl StructuredSchema {
    /// Returns the JSON schema document.
    pub fn json_schema(self) -> Value {
        match self {
            Self::ContractSummary => json!({
                "type": "object",
                "properties": {
                    "contractId": { "type": "string" },
                    "parties": { "type": "array", "items": { "type": "string" } },
                    "startDate": { "type": "string", "format": "date" },
                    "endDate": { "type": "string", "format": "date" },
                    "renewal": { "type": "boolean" }
                },
                "required": ["contractId", "parties", "startDate"]
            }),
            Self::SalesForecast => json!({
                "type": "object",
                "properties": {
                    "region": { "type": "string" },
                    "timeframe": { "type": "string", "enum": ["weekly", "monthly", "quarterly"] },
                    "pipelineAmount": { "type": "number" },
                    "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                },
                "required": ["region", "timeframe", "pipelineAmount"]
            }),
            Self::PiiExtract => json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "email": { "type": "string" },
                    "phone": { "type": "string" }
                },
                "required": ["name"]
            }),
        }
    }

    /// Builds the system instruction embedding this schema.
    pub fn instructions(self, use_tools: bool) -> String {
        let role = if use_tools {
            "You are a tool-using assistant. Call tools when appropriate."
        } else {
            "You are an assistant that produces structured JSON answers."
        };

        format!(
            "{role} Use the following JSON schema and respond with a single JSON object:\n{}",
            self.json_schema()
        )
    }
}

/// Asks the model for a JSON object matching the selected schema.
#[tracing::instrument(skip_all, fields(schema_id = %request.schema_id, use_tools = request.use_tools))]
async fn run(
    State(openai): State<OpenAiClient>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<StructuredRunRequest>,
) -> Result<(StatusCode, Json<StructuredAnswer>)> {
    let schema: StructuredSchema = request.schema_id.parse().map_err(|_| {
        ErrorKind::InvalidSchema
            .with_resource("schema")
            .with_context(format!("Unknown schemaId '{}'", request.schema_id))
    })?;

    let model = request
        .model
        .unwrap_or_else(|| config.openai_chat_model.clone());

    tracing::debug!(
        target: TRACING_TARGET,
        model = %model,
        messages = request.messages.len(),
        "Requesting structured answer"
    );

    let upstream_request = ResponseRequest::new(model, request.messages)
        .with_instructions(schema.instructions(request.use_tools));
    let response = openai.create_response(&api_key, &upstream_request).await?;

    let answer = StructuredAnswer::from_text(response.output_text());

    tracing::info!(
        target: TRACING_TARGET,
        parsed = answer.message.json.get("error").is_none(),
        "Structured answer produced"
    );

    Ok((StatusCode::OK, Json(answer)))
}

fn run_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Run structured output")
        .description(
            "Prompts the model with one of the built-in JSON schemas \
             (`contractSummary`, `salesForecast`, `piiExtract`) and parses its answer.",
        )
        .response::<200, Json<StructuredAnswer>>()
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
        .api_route("/structured/run", post_with(run, run_docs))
        .with_path_items(|item| item.tag("Structured"))
}
