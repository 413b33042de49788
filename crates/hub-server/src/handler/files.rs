//! File upload and listing for the knowledge assistant.
//!
//! Uploaded files are stored by OpenAI under the `assistants` purpose; their
//! ids are what the knowledge route accepts as `fileIds`.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use hub_openai::{ASSISTANTS_PURPOSE, OpenAiClient};

use crate::extract::{Json, MAX_FILE_SIZE, Multipart, OpenAiKey};
use crate::handler::Result;
use crate::handler::response::{ErrorResponse, FileItems};
use crate::middleware::MAX_UPLOAD_BODY_SIZE;
use crate::service::ServiceState;

/// Tracing target for file operations.
const TRACING_TARGET: &str = "hub_server::handler::files";

/// Form field carrying the uploaded files.
const FILES_FIELD: &str = "files";

/// Uploads every `files` part to OpenAI.
///
/// All parts are size-checked before the first upload starts, so an
/// oversized file uploads nothing.
#[tracing::instrument(skip_all)]
async fn upload_files(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FileItems>)> {
    let form = multipart.read_form(MAX_FILE_SIZE).await?;
    let files: Vec<_> = form
        .files
        .into_iter()
        .filter(|file| file.field == FILES_FIELD)
        .collect();

    tracing::debug!(target: TRACING_TARGET, files = files.len(), "Uploading files");

    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        let object = openai
            .upload_file(&api_key, file.into_file_part(), ASSISTANTS_PURPOSE)
            .await?;
        uploaded.push(object);
    }

    tracing::info!(target: TRACING_TARGET, uploaded = uploaded.len(), "Files uploaded");

    Ok((StatusCode::OK, Json(uploaded.into_iter().collect())))
}

fn upload_files_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Upload files")
        .description(
            "Uploads each `files` part of a multipart form for use as knowledge sources. \
             Files are limited to 25 MB each.",
        )
        .response::<200, Json<FileItems>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Lists the caller's knowledge files.
#[tracing::instrument(skip_all)]
async fn list_files(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
) -> Result<(StatusCode, Json<FileItems>)> {
    let files = openai.list_files(&api_key, ASSISTANTS_PURPOSE).await?;

    tracing::debug!(target: TRACING_TARGET, count = files.len(), "Files listed");

    Ok((StatusCode::OK, Json(files.into_iter().collect())))
}

fn list_files_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List files")
        .description("Lists files uploaded for use as knowledge sources.")
        .response::<200, Json<FileItems>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/files/upload", post_with(upload_files, upload_files_docs))
        .api_route("/files/list", get_with(list_files, list_files_docs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_SIZE))
        .with_path_items(|item| item.tag("Files"))
}
