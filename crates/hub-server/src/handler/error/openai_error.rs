//! Translation of upstream OpenAI failures into HTTP errors.

use axum::http::StatusCode;
use hub_openai::Error as OpenAiError;

use super::{Error, ErrorKind};
use crate::TRACING_TARGET_UPSTREAM;

/// Maximum number of characters of an upstream body echoed back as context.
const MAX_CONTEXT_CHARS: usize = 500;

/// Picks the error kind for an upstream status code.
fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::TooManyRequests,
        400..=499 => ErrorKind::BadRequest,
        _ => ErrorKind::BadGateway,
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_CONTEXT_CHARS).collect()
}

impl From<OpenAiError> for Error<'static> {
    fn from(error: OpenAiError) -> Self {
        match error {
            OpenAiError::Upstream { status, body } => {
                tracing::warn!(
                    target: TRACING_TARGET_UPSTREAM,
                    status = status.as_u16(),
                    "Upstream request failed"
                );

                kind_for_status(status)
                    .with_message(format!("OpenAI returned {}", status.as_u16()))
                    .with_resource("openai")
                    .with_context(truncate(&body))
            }
            error if error.is_timeout() => {
                tracing::warn!(target: TRACING_TARGET_UPSTREAM, error = %error, "Upstream timed out");

                ErrorKind::GatewayTimeout
                    .with_message("OpenAI did not answer in time")
                    .with_resource("openai")
            }
            OpenAiError::Http(error) => {
                tracing::error!(
                    target: TRACING_TARGET_UPSTREAM,
                    error = %error,
                    connect = error.is_connect(),
                    "Upstream unreachable"
                );

                ErrorKind::BadGateway
                    .with_message("Could not reach OpenAI")
                    .with_resource("openai")
                    .with_context(error.to_string())
            }
            error @ (OpenAiError::Serde(_) | OpenAiError::InvalidResponse(_)) => {
                tracing::error!(target: TRACING_TARGET_UPSTREAM, error = %error, "Unusable upstream payload");

                ErrorKind::BadGateway
                    .with_message("OpenAI returned an unexpected payload")
                    .with_resource("openai")
                    .with_context(error.to_string())
            }
            OpenAiError::Config(message) => ErrorKind::InternalServerError
                .with_message("OpenAI client is misconfigured")
                .with_context(message),
        }
    }
}
