//! Videos API: job creation, polling and content download.

use reqwest::Method;
use reqwest::multipart::Form;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::UpstreamResponse;
use crate::client::{ApiKey, OpenAiClient, ensure_success};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Parameters of a video generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub prompt: String,
    pub model: String,
    pub seconds: String,
    pub size: String,
}

/// A video job as reported by the API.
///
/// Fields the hub does not read are kept in `extra`, so the job serializes
/// back to the upstream shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct VideoJob {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoJob {
    /// Returns true once the rendered content can be downloaded.
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

impl OpenAiClient {
    /// Starts a video generation job.
    pub async fn create_video(&self, key: &ApiKey, request: &VideoRequest) -> Result<VideoJob> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            seconds = %request.seconds,
            size = %request.size,
            "Creating video job"
        );

        let form = Form::new()
            .text("prompt", request.prompt.clone())
            .text("model", request.model.clone())
            .text("seconds", request.seconds.clone())
            .text("size", request.size.clone());

        let response = self
            .timed_request(Method::POST, "videos", key)
            .multipart(form)
            .send()
            .await?;

        let job = ensure_success(response).await?.json::<VideoJob>().await?;

        tracing::debug!(target: TRACING_TARGET_CLIENT, job_id = %job.id, status = %job.status, "Video job created");
        Ok(job)
    }

    /// Fetches the current state of a video job.
    pub async fn retrieve_video(&self, key: &ApiKey, job_id: &str) -> Result<VideoJob> {
        tracing::debug!(target: TRACING_TARGET_CLIENT, job_id, "Retrieving video job");

        let path = format!("videos/{job_id}");
        let response = self
            .timed_request(Method::GET, &path, key)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    /// Downloads one variant of a finished video job.
    ///
    /// Only transport failures are errors; any upstream status is returned
    /// together with its body.
    pub async fn download_video_content(
        &self,
        key: &ApiKey,
        job_id: &str,
        variant: &str,
    ) -> Result<UpstreamResponse> {
        tracing::debug!(target: TRACING_TARGET_CLIENT, job_id, variant, "Downloading video content");

        let path = format!("videos/{job_id}/content");
        let response = self
            .timed_request(Method::GET, &path, key)
            .query(&[("variant", variant)])
            .send()
            .await?;

        UpstreamResponse::read(response).await
    }
}
