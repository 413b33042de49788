//! Caller-supplied OpenAI credential extraction.

use axum::extract::FromRequestParts;
use axum::http::HeaderName;
use axum::http::request::Parts;
use hub_openai::ApiKey;

use crate::handler::{Error, ErrorKind};

/// Header carrying the caller's OpenAI API key.
pub const OPENAI_KEY_HEADER: HeaderName = HeaderName::from_static("x-openai-key");

/// The caller's OpenAI API key, read from the `X-OPENAI-KEY` header.
///
/// Rejects with `401 missing_api_key` when the header is absent, blank or
/// not valid visible ASCII. The key is forwarded upstream and never logged.
#[must_use]
#[derive(Debug, Clone)]
pub struct OpenAiKey(pub ApiKey);

impl OpenAiKey {
    /// Returns the wrapped key.
    #[inline]
    pub fn api_key(&self) -> &ApiKey {
        &self.0
    }

    /// Returns the wrapped key, consuming the extractor.
    #[inline]
    pub fn into_inner(self) -> ApiKey {
        self.0
    }
}

impl<S> FromRequestParts<S> for OpenAiKey
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&OPENAI_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(ApiKey::new)
            .map(Self)
            .ok_or_else(|| ErrorKind::MissingApiKey.into_error())
    }
}

impl aide::OperationInput for OpenAiKey {}
