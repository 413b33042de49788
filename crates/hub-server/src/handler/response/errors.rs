use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::Serialize;

/// HTTP error response body.
///
/// Serialized as `{ name, message, resource?, suggestion?, context? }`; the
/// status code only travels in the response line.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// The resource that the error relates to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Helpful suggestion for resolving the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,
    /// Additional detail, such as the upstream error body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "Invalid request data.",
        StatusCode::BAD_REQUEST,
    );
    pub const EMPTY_CORPUS: Self = Self::suggested(
        "empty_corpus",
        "The corpus has no indexed documents.",
        "Index documents into the corpus before searching it.",
        StatusCode::NOT_FOUND,
    );
    pub const FILE_TOO_LARGE: Self = Self::new(
        "file_too_large",
        "Max size 25MB per file.",
        StatusCode::PAYLOAD_TOO_LARGE,
    );
    pub const FORBIDDEN: Self = Self::new("forbidden", "Access denied.", StatusCode::FORBIDDEN);
    pub const GUARDRAILS_NO_FILES: Self = Self::suggested(
        "guardrails_no_files",
        "Guardrails require at least one file.",
        "Pass fileIds or disable guardrails.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_AUDIO: Self = Self::new(
        "invalid_audio",
        "Expected audio file upload.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_PROMPT: Self = Self::new(
        "invalid_prompt",
        "Provide a non-empty prompt string.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_SCHEMA: Self = Self::new(
        "invalid_schema",
        "schemaId must be contractSummary|salesForecast|piiExtract.",
        StatusCode::BAD_REQUEST,
    );
    pub const INVALID_VARIANT: Self = Self::new(
        "invalid_variant",
        "Variant must be video|thumbnail|spritesheet.",
        StatusCode::BAD_REQUEST,
    );
    pub const MISSING_API_KEY: Self = Self::suggested(
        "missing_api_key",
        "Missing X-OPENAI-KEY header.",
        "Send your OpenAI API key in the X-OPENAI-KEY header.",
        StatusCode::UNAUTHORIZED,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Missing path parameter.",
        StatusCode::BAD_REQUEST,
    );
    pub const NO_DOCUMENTS: Self = Self::new(
        "no_documents",
        "At least one document is required.",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self =
        Self::new("not_found", "Resource not found.", StatusCode::NOT_FOUND);
    pub const TOO_MANY_REQUESTS: Self = Self::new(
        "too_many_requests",
        "Rate limit exceeded.",
        StatusCode::TOO_MANY_REQUESTS,
    );
    pub const UNAUTHORIZED: Self = Self::new(
        "unauthorized",
        "Invalid credentials.",
        StatusCode::UNAUTHORIZED,
    );

    // 5xx Server Errors
    pub const BAD_GATEWAY: Self = Self::new(
        "bad_gateway",
        "Upstream service error.",
        StatusCode::BAD_GATEWAY,
    );
    pub const EMBEDDING_FAILED: Self = Self::new(
        "embedding_failed",
        "Failed to embed the query.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const GATEWAY_TIMEOUT: Self = Self::new(
        "gateway_timeout",
        "Request timed out.",
        StatusCode::GATEWAY_TIMEOUT,
    );
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "Internal server error.",
        StatusCode::INTERNAL_SERVER_ERROR,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            suggestion: None,
            context: None,
            status,
        }
    }

    /// Creates a new error response carrying a default suggestion.
    #[inline]
    const fn suggested(
        name: &'a str,
        message: &'a str,
        suggestion: &'a str,
        status: StatusCode,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            suggestion: Some(Cow::Borrowed(suggestion)),
            context: None,
            status,
        }
    }

    /// Sets the resource, merging with an existing one.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        let new_resource = resource.into();
        self.resource = Some(match self.resource {
            Some(existing) => Cow::Owned(format!("{}/{}", existing, new_resource)),
            None => new_resource,
        });
        self
    }

    /// Appends to the message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let new_message = message.into();
        let base = self.message.trim_end_matches('.');
        self.message = Cow::Owned(format!("{}. {}", base, new_message));
        self
    }

    /// Attaches context, merging with existing context.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        let new_context = context.into();
        self.context = Some(match self.context {
            Some(existing) => Cow::Owned(format!("{}; {}", existing, new_context)),
            None => new_context,
        });
        self
    }

    /// Sets the suggestion, replacing any default one.
    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl Default for ErrorResponse<'_> {
    #[inline]
    fn default() -> Self {
        Self::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
