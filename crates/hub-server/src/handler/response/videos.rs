//! Video generation response types.

use hub_openai::VideoJob;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::request::VideoVariant;

/// Response of the video generate route: the upstream job as created.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoJobCreated {
    pub job: VideoJob,
}

/// Current state of a video job, with download links once it completed.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoJobStatus {
    pub id: String,
    /// `queued`, `in_progress`, `completed` or `failed`.
    pub status: String,
    /// Completion percentage.
    pub progress: Option<f64>,
    pub model: Option<String>,
    pub seconds: Option<Value>,
    pub size: Option<String>,
    pub error: Option<Value>,
    /// Thumbnail download path; set only for completed jobs.
    pub poster_url: Option<String>,
    /// Video download path; set only for completed jobs.
    pub video_url: Option<String>,
}

/// Returns the hub path that serves one variant of a job.
pub fn video_content_path(job_id: &str, variant: VideoVariant) -> String {
    format!("/api/video/jobs/{job_id}/content?variant={variant}")
}

impl From<VideoJob> for VideoJobStatus {
    fn from(job: VideoJob) -> Self {
        let (poster_url, video_url) = if job.is_completed() {
            (
                Some(video_content_path(&job.id, VideoVariant::Thumbnail)),
                Some(video_content_path(&job.id, VideoVariant::Video)),
            )
        } else {
            (None, None)
        };

        Self {
            id: job.id,
            status: job.status,
            progress: job.progress,
            model: job.model,
            seconds: job.seconds,
            size: job.size,
            error: job.error,
            poster_url,
            video_url,
        }
    }
}
