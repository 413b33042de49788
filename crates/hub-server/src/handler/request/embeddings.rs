//! Embeddings request types.

use std::collections::HashMap;

use hub_vector::VectorRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_top_k() -> usize {
    3
}

/// A document to embed and index.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    /// Document id; generated from the position when absent or empty.
    pub id: Option<String>,
    /// Document content.
    pub text: String,
    /// Opaque metadata returned with search results.
    #[serde(default)]
    pub meta: HashMap<String, serde_json::Value>,
}

impl DocumentInput {
    /// Converts the document into an index record.
    ///
    /// `position` is the index of the document in the request and names it
    /// `doc_{position}` when no id was supplied.
    pub fn into_record(self, position: usize, embedding: Vec<f32>) -> VectorRecord {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| format!("doc_{position}"));

        VectorRecord::new(id, self.text, embedding).with_meta(self.meta)
    }
}

/// Request payload for indexing documents into a corpus.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocumentsRequest {
    /// Target corpus, created on first insert.
    #[validate(length(min = 1, max = 255))]
    pub corpus_id: String,
    /// Documents to embed, in order.
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub docs: Vec<DocumentInput>,
    /// Embedding model override.
    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,
}

/// Request payload for a similarity search.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Corpus to search.
    #[validate(length(min = 1, max = 255))]
    pub corpus_id: String,
    /// Free-text query.
    #[validate(length(min = 1))]
    pub query: String,
    /// Maximum number of results.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Embedding model override.
    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_ids_are_generated_from_position() {
        let doc: DocumentInput = serde_json::from_value(json!({ "text": "hello" })).unwrap();
        let record = doc.into_record(4, vec![1.0]);
        assert_eq!(record.id, "doc_4");
        assert!(record.meta.is_empty());

        let doc: DocumentInput =
            serde_json::from_value(json!({ "id": "", "text": "hello" })).unwrap();
        assert_eq!(doc.into_record(0, vec![1.0]).id, "doc_0");
    }

    #[test]
    fn supplied_ids_and_meta_are_kept() {
        let doc: DocumentInput = serde_json::from_value(json!({
            "id": "faq-1",
            "text": "Refunds take 5 days",
            "meta": { "lang": "en" }
        }))
        .unwrap();

        let record = doc.into_record(0, vec![0.5, 0.5]);
        assert_eq!(record.id, "faq-1");
        assert_eq!(record.meta["lang"], "en");
    }

    #[test]
    fn search_defaults_to_three_results() {
        let request: SearchRequest =
            serde_json::from_value(json!({ "corpusId": "c1", "query": "refund" })).unwrap();
        assert_eq!(request.top_k, 3);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn large_top_k_is_accepted() {
        let request: SearchRequest = serde_json::from_value(json!({
            "corpusId": "c1",
            "query": "refund",
            "topK": 5000
        }))
        .unwrap();
        assert_eq!(request.top_k, 5000);
        assert!(request.validate().is_ok());
    }
}
