//! Liveness response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Liveness check response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    /// Always `ok`.
    pub status: String,
    /// Server time of the check.
    pub timestamp: Timestamp,
}

impl PingResponse {
    /// Creates a response stamped with the current time.
    pub fn now() -> Self {
        Self {
            status: "ok".to_owned(),
            timestamp: Timestamp::now(),
        }
    }
}
