//! Video generation jobs: creation, polling and content download.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hub_openai::OpenAiClient;

use crate::extract::{Json, OpenAiKey, Path};
use crate::handler::Result;
use crate::handler::request::{VideoContentQuery, VideoGenerateRequest, VideoJobPathParams};
use crate::handler::response::{ErrorResponse, VideoJobCreated, VideoJobStatus};
use crate::service::ServiceState;

/// Tracing target for video operations.
const TRACING_TARGET: &str = "hub_server::handler::videos";

/// Starts a video generation job.
#[tracing::instrument(skip_all)]
async fn generate_video(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    Json(request): Json<VideoGenerateRequest>,
) -> Result<(StatusCode, Json<VideoJobCreated>)> {
    let upstream_request = request.to_video_request()?;
    let job = openai.create_video(&api_key, &upstream_request).await?;

    tracing::info!(
        target: TRACING_TARGET,
        job_id = %job.id,
        model = %upstream_request.model,
        seconds = %upstream_request.seconds,
        "Video job started"
    );

    Ok((StatusCode::OK, Json(VideoJobCreated { job })))
}

fn generate_video_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Generate video")
        .description(
            "Starts a video job. Unsupported model, length or size values fall back to \
             `sora-2`, 8 seconds and `1280x720`.",
        )
        .response::<200, Json<VideoJobCreated>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Polls a video job.
#[tracing::instrument(skip_all)]
async fn get_video_job(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    Path(path_params): Path<VideoJobPathParams>,
) -> Result<(StatusCode, Json<VideoJobStatus>)> {
    let job = openai.retrieve_video(&api_key, path_params.job_id()?).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        job_id = %job.id,
        status = %job.status,
        "Video job polled"
    );

    Ok((StatusCode::OK, Json(job.into())))
}

fn get_video_job_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get video job")
        .description(
            "Returns the job state. Completed jobs carry `posterUrl` and `videoUrl` \
             download paths.",
        )
        .response::<200, Json<VideoJobStatus>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Streams one variant of a finished job back to the caller.
///
/// Upstream failures are relayed with their status and body.
#[tracing::instrument(skip_all)]
async fn get_video_content(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    Path(path_params): Path<VideoJobPathParams>,
    Query(query): Query<VideoContentQuery>,
) -> Result<Response> {
    let job_id = path_params.job_id()?;
    let variant = query.variant()?;

    let upstream = openai
        .download_video_content(&api_key, job_id, variant.as_ref())
        .await?;

    let content_type = upstream
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok());

    if !upstream.is_success() {
        let content_type =
            content_type.unwrap_or_else(|| HeaderValue::from_static("application/json"));
        return Ok((upstream.status, [(CONTENT_TYPE, content_type)], upstream.body).into_response());
    }

    tracing::info!(
        target: TRACING_TARGET,
        job_id,
        variant = %variant,
        size = upstream.body.len(),
        "Video content downloaded"
    );

    let content_type =
        content_type.unwrap_or_else(|| HeaderValue::from_static(variant.fallback_content_type()));
    let headers = [
        (CONTENT_TYPE, content_type),
        (CONTENT_LENGTH, HeaderValue::from(upstream.body.len())),
        (CACHE_CONTROL, HeaderValue::from_static("no-store")),
    ];

    Ok((StatusCode::OK, headers, upstream.body).into_response())
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/video/generate", post_with(generate_video, generate_video_docs))
        .api_route("/video/jobs/{jobId}", get_with(get_video_job, get_video_job_docs))
        // Binary passthrough - the body is opaque to the hub
        .route(
            "/video/jobs/{jobId}/content",
            axum::routing::get(get_video_content),
        )
        .with_path_items(|item| item.tag("Video"))
}
