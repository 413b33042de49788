use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::TRACING_TARGET_STREAM;

/// Upstream event type carrying an incremental text delta.
pub const OUTPUT_TEXT_DELTA: &str = "response.output_text.delta";

/// Upstream event type marking the end of a response.
pub const RESPONSE_COMPLETED: &str = "response.completed";

/// Sentinel payload some upstreams send after the last event.
const DONE_SENTINEL: &str = "[DONE]";

/// Error code reported for frames whose payload is not valid JSON.
pub const STREAM_PARSE_ERROR: &str = "stream_parse_error";

/// A frame sent to the downstream client.
///
/// Serializes to one of `{"delta":..}`, `{"done":true}` or
/// `{"error":..,"detail":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayEvent {
    Delta { delta: String },
    Done { done: bool },
    Error { error: String, detail: String },
}

impl RelayEvent {
    /// Creates a text delta event.
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { delta: text.into() }
    }

    /// Creates the terminal event.
    pub fn done() -> Self {
        Self::Done { done: true }
    }

    /// Creates a parse error event carrying the offending payload.
    pub fn parse_error(detail: impl Into<String>) -> Self {
        Self::Error {
            error: STREAM_PARSE_ERROR.to_owned(),
            detail: detail.into(),
        }
    }

    /// Returns true for the terminal event.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Extracts the data payload of a frame.
///
/// Multiple `data:` lines are joined with a newline. Returns `None` when the
/// frame has no data lines (comments, `event:` only frames).
pub fn frame_data(frame: &str) -> Option<String> {
    let mut lines = frame
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .peekable();

    lines.peek()?;
    Some(lines.collect::<Vec<_>>().join("\n"))
}

/// Maps one upstream frame to the event it produces, if any.
pub fn parse_frame(frame: &str) -> Option<RelayEvent> {
    let payload = frame_data(frame)?;
    let payload = payload.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(_) => return Some(RelayEvent::parse_error(payload)),
    };

    match value.get("type").and_then(Value::as_str) {
        Some(OUTPUT_TEXT_DELTA) => value
            .get("delta")
            .and_then(Value::as_str)
            .filter(|delta| !delta.is_empty())
            .map(RelayEvent::delta),
        Some(RESPONSE_COMPLETED) => Some(RelayEvent::done()),
        other => {
            tracing::trace!(
                target: TRACING_TARGET_STREAM,
                event_type = other.unwrap_or("<none>"),
                "Ignoring upstream event"
            );
            None
        }
    }
}
