//! Realtime session minting.

use bytes::Bytes;
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;

use crate::client::{ApiKey, OpenAiClient};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Body of a `POST /realtime/sessions` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealtimeSessionRequest {
    pub model: String,
    pub voice: String,
    pub instructions: String,
}

impl RealtimeSessionRequest {
    /// Voice used when the caller does not pick one.
    pub const DEFAULT_VOICE: &'static str = "verse";

    /// Creates a session request with the default voice.
    pub fn new(model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            voice: Self::DEFAULT_VOICE.to_owned(),
            instructions: instructions.into(),
        }
    }
}

/// A raw upstream answer, forwarded as-is regardless of status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Reads status, content type and body of an answer regardless of status.
    pub(crate) async fn read(response: Response) -> Result<Self> {
        let status = response.status();
        let path = response.url().path().to_owned();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                path = %path,
                "Upstream returned an error status"
            );
        }

        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl OpenAiClient {
    /// Mints an ephemeral realtime session.
    ///
    /// Only transport failures are errors; any upstream status is returned
    /// together with its body.
    pub async fn create_realtime_session(
        &self,
        key: &ApiKey,
        request: &RealtimeSessionRequest,
    ) -> Result<UpstreamResponse> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            voice = %request.voice,
            "Creating realtime session"
        );

        let response = self
            .timed_request(Method::POST, "realtime/sessions", key)
            .json(request)
            .send()
            .await?;

        UpstreamResponse::read(response).await
    }
}
