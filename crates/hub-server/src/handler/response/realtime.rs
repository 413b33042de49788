//! Realtime voice response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Response of the transcription route.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionText {
    /// Trimmed transcript.
    pub text: String,
}

/// A spoken assistant turn.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeReply {
    pub text: String,
    /// Base64 speech of `text`; empty when there was nothing to say.
    pub audio: String,
    pub audio_mime: String,
}

impl RealtimeReply {
    /// MIME type of the synthesized speech.
    pub const AUDIO_MIME: &'static str = "audio/mpeg";

    pub fn new(text: String, audio: String) -> Self {
        Self {
            text,
            audio,
            audio_mime: Self::AUDIO_MIME.to_owned(),
        }
    }
}
