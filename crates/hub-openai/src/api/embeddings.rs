//! Embeddings API.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{ApiKey, OpenAiClient, ensure_success};
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Input accepted by `POST /embeddings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

impl From<String> for EmbeddingInput {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(value: Vec<String>) -> Self {
        Self::Batch(value)
    }
}

impl EmbeddingInput {
    fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(inputs) => inputs.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a EmbeddingInput,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

impl OpenAiClient {
    /// Embeds every input with `model`, returning vectors in input order.
    pub async fn create_embeddings(
        &self,
        key: &ApiKey,
        model: &str,
        input: impl Into<EmbeddingInput>,
    ) -> Result<Vec<Vec<f32>>> {
        let input = input.into();
        let expected = input.len();

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model,
            inputs = expected,
            "Creating embeddings"
        );

        let response = self
            .timed_request(Method::POST, "embeddings", key)
            .json(&EmbeddingRequest {
                model,
                input: &input,
            })
            .send()
            .await?;

        let mut parsed = ensure_success(response)
            .await?
            .json::<EmbeddingResponse>()
            .await?;

        if parsed.data.len() != expected {
            return Err(Error::invalid_response(format!(
                "expected {expected} embeddings, got {}",
                parsed.data.len()
            )));
        }

        parsed.data.sort_by_key(|data| data.index);
        Ok(parsed.data.into_iter().map(|data| data.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn input_serializes_untagged() {
        let single = serde_json::to_value(EmbeddingInput::from("a".to_owned())).unwrap();
        assert_eq!(single, json!("a"));

        let batch = serde_json::to_value(EmbeddingInput::from(vec!["a".to_owned(), "b".to_owned()]))
            .unwrap();
        assert_eq!(batch, json!(["a", "b"]));
    }
}
