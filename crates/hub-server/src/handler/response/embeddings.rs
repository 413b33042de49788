//! Embeddings response types.

use std::collections::HashMap;

use hub_vector::{ScoredRecord, VectorRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result of indexing documents.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    /// Number of documents inserted by this request.
    pub count: usize,
    /// Size of the corpus after the insert.
    pub total: usize,
}

/// A single search hit.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub text: String,
    /// Cosine similarity to the query.
    pub score: f32,
    pub meta: HashMap<String, serde_json::Value>,
}

impl From<ScoredRecord> for SearchResult {
    fn from(record: ScoredRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            score: record.score,
            meta: record.meta,
        }
    }
}

/// Search hits in descending score order.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// A stored document without its embedding.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorpusDocument {
    pub id: String,
    pub text: String,
    pub meta: HashMap<String, serde_json::Value>,
}

impl From<VectorRecord> for CorpusDocument {
    fn from(record: VectorRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            meta: record.meta,
        }
    }
}

/// Contents of a corpus in insertion order.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorpusResponse {
    pub corpus_id: String,
    pub count: usize,
    pub documents: Vec<CorpusDocument>,
}

impl CorpusResponse {
    /// Creates a listing from stored records.
    pub fn new(corpus_id: impl Into<String>, records: Vec<VectorRecord>) -> Self {
        Self {
            corpus_id: corpus_id.into(),
            count: records.len(),
            documents: records.into_iter().map(Into::into).collect(),
        }
    }
}
