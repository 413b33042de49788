//! Records stored in a corpus and the scored view returned by search.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A document together with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Identifier, unique within a corpus by convention only.
    pub id: String,
    /// Original document content.
    pub text: String,
    /// The embedding vector.
    pub embedding: Vec<f32>,
    /// Opaque caller metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, serde_json::Value>,
}

impl VectorRecord {
    /// Creates a new record without metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding,
            meta: HashMap::new(),
        }
    }

    /// Replaces the metadata of the record.
    pub fn with_meta(
        mut self,
        meta: impl IntoIterator<Item = (impl Into<String>, serde_json::Value)>,
    ) -> Self {
        self.meta = meta.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self
    }

    /// Adds a single metadata field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Returns the dimensionality of the embedding.
    #[inline]
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// A search hit: the record without its embedding, plus the similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub text: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta: HashMap<String, serde_json::Value>,
}

impl ScoredRecord {
    pub(crate) fn from_record(record: &VectorRecord, score: f32) -> Self {
        Self {
            id: record.id.clone(),
            text: record.text.clone(),
            score,
            meta: record.meta.clone(),
        }
    }
}
