//! Audio API: speech-to-text and text-to-speech.

use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};

use super::FilePart;
use crate::client::{ApiKey, OpenAiClient, ensure_success};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Result of a transcription call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Transcription {
    #[serde(default)]
    pub text: String,
}

/// Body of a `POST /audio/speech` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
    pub response_format: String,
}

impl SpeechRequest {
    /// Creates an MP3 speech request.
    pub fn mp3(
        model: impl Into<String>,
        voice: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            voice: voice.into(),
            input: input.into(),
            response_format: "mp3".to_owned(),
        }
    }
}

impl OpenAiClient {
    /// Transcribes an audio recording.
    pub async fn transcribe(
        &self,
        key: &ApiKey,
        model: &str,
        audio: FilePart,
    ) -> Result<Transcription> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model,
            size = audio.len(),
            "Transcribing audio"
        );

        let form = Form::new()
            .text("model", model.to_owned())
            .part("file", audio.into_part()?);

        let response = self
            .timed_request(Method::POST, "audio/transcriptions", key)
            .multipart(form)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    /// Synthesizes speech and returns the encoded audio.
    pub async fn create_speech(&self, key: &ApiKey, request: &SpeechRequest) -> Result<Bytes> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            voice = %request.voice,
            input_len = request.input.len(),
            "Synthesizing speech"
        );

        let response = self
            .timed_request(Method::POST, "audio/speech", key)
            .json(request)
            .send()
            .await?;

        Ok(ensure_success(response).await?.bytes().await?)
    }
}
