//! Realtime voice: session minting, transcription and spoken replies.
//!
//! The browser cannot hold a long-lived key, so the hub mints an ephemeral
//! session with the caller's key and returns OpenAI's answer unchanged.
//! Clients without a realtime connection use the transcribe and respond
//! routes for push-to-talk turns instead.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use hub_openai::{FilePart, OpenAiClient, RealtimeSessionRequest, ResponseRequest, SpeechRequest};

use crate::extract::{Json, MAX_FILE_SIZE, Multipart, OpenAiKey, ValidateJson};
use crate::handler::request::{RealtimeRespondRequest, RealtimeTokenRequest};
use crate::handler::response::{ErrorResponse, RealtimeReply, TranscriptionText};
use crate::handler::{ErrorKind, Result};
use crate::middleware::MAX_UPLOAD_BODY_SIZE;
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for realtime operations.
const TRACING_TARGET: &str = "hub_server::handler::realtime";

/// Speech-to-text model.
const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Text-to-speech model.
const SPEECH_MODEL: &str = "gpt-4o-mini-tts";

/// File name recordings are uploaded under.
const RECORDING_FILENAME: &str = "recording.webm";

/// Mints a realtime session and relays the upstream status and body.
///
/// The body is optional: anything that is not a JSON object is treated as
/// an empty request.
#[tracing::instrument(skip_all)]
async fn create_token(
    State(openai): State<OpenAiClient>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    body: Bytes,
) -> Result<Response> {
    let request = RealtimeTokenRequest::from_body(&body);
    let model = request
        .model
        .clone()
        .filter(|model| !model.is_empty())
        .unwrap_or_else(|| config.openai_realtime_model.clone());

    let session = RealtimeSessionRequest::new(model, request.instructions());
    let upstream = openai.create_realtime_session(&api_key, &session).await?;

    tracing::info!(
        target: TRACING_TARGET,
        status = upstream.status.as_u16(),
        model = %session.model,
        "Realtime session requested"
    );

    let content_type = upstream
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((upstream.status, [(CONTENT_TYPE, content_type)], upstream.body).into_response())
}

/// Transcribes the `audio` part of a multipart form.
#[tracing::instrument(skip_all)]
async fn transcribe(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    multipart: Multipart,
) -> Result<(StatusCode, Json<TranscriptionText>)> {
    let mut form = multipart.read_form(MAX_FILE_SIZE).await?;
    let audio = form
        .take_file("audio")
        .ok_or_else(|| ErrorKind::InvalidAudio.into_error())?;

    tracing::debug!(target: TRACING_TARGET, size = audio.data.len(), "Transcribing recording");

    let recording = FilePart::new(RECORDING_FILENAME, audio.data);
    let transcription = openai
        .transcribe(&api_key, TRANSCRIPTION_MODEL, recording)
        .await?;

    let text = transcription.text.trim().to_owned();
    tracing::info!(target: TRACING_TARGET, text_len = text.len(), "Recording transcribed");

    Ok((StatusCode::OK, Json(TranscriptionText { text })))
}

fn transcribe_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Transcribe recording")
        .description("Transcribes the `audio` file of a multipart form.")
        .response::<200, Json<TranscriptionText>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Answers a turn in text and, when there is something to say, speech.
#[tracing::instrument(skip_all)]
async fn respond(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<RealtimeRespondRequest>,
) -> Result<(StatusCode, Json<RealtimeReply>)> {
    let input = request.input()?;
    let upstream_request = ResponseRequest::new(request.model.clone(), input)
        .with_instructions(RealtimeRespondRequest::INSTRUCTIONS);

    let response = openai.create_response(&api_key, &upstream_request).await?;
    let text = response.output_text().unwrap_or_default().trim().to_owned();

    let audio = if text.is_empty() {
        String::new()
    } else {
        let speech = SpeechRequest::mp3(SPEECH_MODEL, request.voice.clone(), text.clone());
        let encoded = openai.create_speech(&api_key, &speech).await?;
        base64::engine::general_purpose::STANDARD.encode(&encoded)
    };

    tracing::info!(
        target: TRACING_TARGET,
        text_len = text.len(),
        audio_len = audio.len(),
        "Realtime reply produced"
    );

    Ok((StatusCode::OK, Json(RealtimeReply::new(text, audio))))
}

fn respond_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Respond to a voice turn")
        .description(
            "Answers the prompt with the conversation history and returns the text \
             together with base64 MP3 speech of it.",
        )
        .response::<200, Json<RealtimeReply>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        // Passthrough endpoint - the upstream answer is opaque to the hub
        .route("/realtime/token", axum::routing::post(create_token))
        .api_route("/realtime/transcribe", post_with(transcribe, transcribe_docs))
        .api_route("/realtime/respond", post_with(respond, respond_docs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_SIZE))
        .with_path_items(|item| item.tag("Realtime"))
}
