//! Error types for OpenAI API calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for hub-openai operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for hub-openai operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The upstream API answered with a non-success status.
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// The upstream API answered successfully but the payload was unusable.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// The client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Returns the upstream status code for [`Error::Upstream`].
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the upstream host could not be reached.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Http(err) if err.is_connect())
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(err) if err.is_timeout())
    }
}
