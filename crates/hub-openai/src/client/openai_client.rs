//! Shared HTTP client for the OpenAI API.

use std::fmt;
use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};

use super::{ApiKey, OpenAiConfig};
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Inner client that holds the HTTP client and configuration.
struct ClientInner {
    http: Client,
    config: OpenAiConfig,
}

impl fmt::Debug for ClientInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientInner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// OpenAI API client.
///
/// Cheap to clone; all clones share one connection pool. Credentials are
/// passed per call, so a single client serves every caller.
///
/// ```rust,no_run
/// use hub_openai::{ApiKey, OpenAiClient};
///
/// # async fn example() -> hub_openai::Result<()> {
/// let client = OpenAiClient::with_defaults()?;
/// let key = ApiKey::new("sk-...").unwrap();
/// let embeddings = client
///     .create_embeddings(&key, "text-embedding-3-small", vec!["hello".to_owned()])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    inner: Arc<ClientInner>,
}

impl OpenAiClient {
    /// Creates a new client with the given configuration.
    ///
    /// Only a connect timeout is set on the underlying client. Non-streaming
    /// calls add the configured request timeout per request, so streams are
    /// never cut off mid-generation.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = config.effective_base_url(),
            connect_timeout_ms = config.effective_connect_timeout().as_millis() as u64,
            "Creating OpenAI client"
        );

        let http = Client::builder()
            .connect_timeout(config.effective_connect_timeout())
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner { http, config }),
        })
    }

    /// Creates a new client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenAiConfig::default())
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.inner.config
    }

    /// Starts an authenticated request against `path` with no total timeout.
    pub(crate) fn request(&self, method: Method, path: &str, key: &ApiKey) -> RequestBuilder {
        self.inner
            .http
            .request(method, self.inner.config.endpoint(path))
            .bearer_auth(key.expose())
    }

    /// Starts an authenticated request bounded by the configured request timeout.
    pub(crate) fn timed_request(
        &self,
        method: Method,
        path: &str,
        key: &ApiKey,
    ) -> RequestBuilder {
        self.request(method, path, key)
            .timeout(self.inner.config.effective_request_timeout())
    }
}

/// Turns a non-success response into [`Error::Upstream`], keeping its body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_owned();
    let body = response.text().await.unwrap_or_default();

    tracing::warn!(
        target: TRACING_TARGET_CLIENT,
        status = status.as_u16(),
        path = %url,
        body_len = body.len(),
        "Upstream returned an error status"
    );

    Err(Error::Upstream { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_uses_config() {
        let config = OpenAiConfig::builder()
            .with_base_url("http://127.0.0.1:1/v1")
            .build()
            .unwrap();

        let client = OpenAiClient::new(config).unwrap();
        assert_eq!(client.config().effective_base_url(), "http://127.0.0.1:1/v1");
    }

    #[test]
    fn clones_share_inner() {
        let client = OpenAiClient::with_defaults().unwrap();
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.inner, &clone.inner));
    }
}
