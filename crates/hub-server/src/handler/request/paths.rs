//! Path parameter types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Path parameters for corpus-scoped routes.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorpusPathParams {
    /// Caller-chosen corpus key.
    pub corpus_id: String,
}
