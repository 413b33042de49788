//! Configuration for the OpenAI client.

use std::time::Duration;

use derive_builder::Builder;
use url::Url;

/// Default values for configuration options.
mod defaults {
    /// OpenAI API base URL.
    pub const BASE_URL: &str = "https://api.openai.com/v1";

    /// Default connect timeout in seconds.
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Default request timeout in seconds, applied to non-streaming calls.
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Default user agent prefix.
    pub const USER_AGENT: &str = concat!("openai-hub/", env!("CARGO_PKG_VERSION"));
}

/// Validates the [`OpenAiConfig`] before building.
fn validate_config(builder: &OpenAiConfigBuilder) -> std::result::Result<(), String> {
    if let Some(Some(base_url)) = &builder.base_url {
        let url = Url::parse(base_url)
            .map_err(|e| format!("Base URL '{}' is not a valid URL: {}", base_url, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "Base URL must start with http:// or https://, got {}",
                base_url
            ));
        }
    }

    if let Some(Some(timeout)) = builder.connect_timeout
        && timeout.is_zero()
    {
        return Err("Connect timeout must be greater than 0".to_string());
    }

    if let Some(Some(timeout)) = builder.request_timeout
        && timeout.is_zero()
    {
        return Err("Request timeout must be greater than 0".to_string());
    }

    Ok(())
}

/// Configuration for [`OpenAiClient`] behavior.
///
/// ```rust
/// use std::time::Duration;
/// use hub_openai::OpenAiConfig;
///
/// let config = OpenAiConfig::builder()
///     .with_base_url("http://127.0.0.1:8080/v1")
///     .with_connect_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.effective_base_url(), "http://127.0.0.1:8080/v1");
/// ```
///
/// [`OpenAiClient`]: crate::OpenAiClient
#[derive(Debug, Clone, Default, Builder)]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "validate_config")
)]
pub struct OpenAiConfig {
    /// Base URL of the API, including the version segment (default: `https://api.openai.com/v1`).
    #[builder(default)]
    base_url: Option<String>,

    /// Timeout for establishing connections (default: 10s).
    #[builder(default)]
    connect_timeout: Option<Duration>,

    /// Total timeout for non-streaming requests (default: 60s).
    #[builder(default)]
    request_timeout: Option<Duration>,

    /// User-Agent header sent with every request.
    #[builder(default)]
    user_agent: Option<String>,
}

impl OpenAiConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> OpenAiConfigBuilder {
        OpenAiConfigBuilder::default()
    }

    /// Returns the effective base URL without a trailing slash.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(defaults::BASE_URL)
            .trim_end_matches('/')
    }

    /// Returns the effective connect timeout.
    pub fn effective_connect_timeout(&self) -> Duration {
        self.connect_timeout
            .unwrap_or_else(|| Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS))
    }

    /// Returns the effective timeout for non-streaming requests.
    pub fn effective_request_timeout(&self) -> Duration {
        self.request_timeout
            .unwrap_or_else(|| Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
    }

    /// Returns the effective user agent.
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(defaults::USER_AGENT)
    }

    /// Joins `path` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.effective_base_url(),
            path.trim_start_matches('/')
        )
    }
}
