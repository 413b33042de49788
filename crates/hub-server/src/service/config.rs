use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use hub_openai::{OpenAiClient, OpenAiConfig};
use serde::{Deserialize, Serialize};

use crate::service::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// OpenAI API base URL.
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

    /// Connect timeout for upstream calls in seconds.
    pub const OPENAI_CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Total timeout for non-streaming upstream calls in seconds.
    pub const OPENAI_REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Model used by chat-style routes when the request omits one.
    pub const OPENAI_CHAT_MODEL: &str = "gpt-4.1-mini";

    /// Model used by the embeddings routes when the request omits one.
    pub const OPENAI_EMBEDDING_MODEL: &str = "text-embedding-3-small";

    /// Model used when minting realtime sessions.
    pub const OPENAI_REALTIME_MODEL: &str = "gpt-4o-realtime-preview";
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Base URL of the OpenAI API, including the version segment.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_BASE_URL", default_value = defaults::OPENAI_BASE_URL)
    )]
    #[builder(default = "defaults::OPENAI_BASE_URL.to_owned()")]
    pub openai_base_url: String,

    /// Connect timeout for upstream calls in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_CONNECT_TIMEOUT", default_value_t = defaults::OPENAI_CONNECT_TIMEOUT_SECS)
    )]
    #[builder(default = "defaults::OPENAI_CONNECT_TIMEOUT_SECS")]
    pub openai_connect_timeout: u64,

    /// Total timeout for non-streaming upstream calls in seconds.
    ///
    /// Streaming relays are only bounded by the connect timeout.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_REQUEST_TIMEOUT", default_value_t = defaults::OPENAI_REQUEST_TIMEOUT_SECS)
    )]
    #[builder(default = "defaults::OPENAI_REQUEST_TIMEOUT_SECS")]
    pub openai_request_timeout: u64,

    /// Default model for support chat, knowledge and structured routes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_CHAT_MODEL", default_value = defaults::OPENAI_CHAT_MODEL)
    )]
    #[builder(default = "defaults::OPENAI_CHAT_MODEL.to_owned()")]
    pub openai_chat_model: String,

    /// Default model for embeddings.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_EMBEDDING_MODEL", default_value = defaults::OPENAI_EMBEDDING_MODEL)
    )]
    #[builder(default = "defaults::OPENAI_EMBEDDING_MODEL.to_owned()")]
    pub openai_embedding_model: String,

    /// Default model for realtime sessions.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OPENAI_REALTIME_MODEL", default_value = defaults::OPENAI_REALTIME_MODEL)
    )]
    #[builder(default = "defaults::OPENAI_REALTIME_MODEL.to_owned()")]
    pub openai_realtime_model: String,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Returns the connect timeout for upstream calls.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.openai_connect_timeout)
    }

    /// Returns the total timeout for non-streaming upstream calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.openai_request_timeout)
    }

    /// Builds the shared OpenAI client.
    pub fn connect_openai(&self) -> Result<OpenAiClient> {
        let config = OpenAiConfig::builder()
            .with_base_url(self.openai_base_url.clone())
            .with_connect_timeout(self.connect_timeout())
            .with_request_timeout(self.request_timeout())
            .build()
            .map_err(|e| {
                Error::config(format!("Invalid OpenAI client configuration: {e}"))
            })?;

        OpenAiClient::new(config).map_err(|e| {
            Error::internal("openai", "Failed to create HTTP client").with_source(e)
        })
    }
}

impl ServiceConfigBuilder {
    fn validate(builder: &ServiceConfigBuilder) -> std::result::Result<(), String> {
        if let Some(base_url) = &builder.openai_base_url {
            let url = url::Url::parse(base_url)
                .map_err(|e| format!("OpenAI base URL '{}' is invalid: {}", base_url, e))?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err("OpenAI base URL must start with 'http://' or 'https://'".to_owned());
            }
        }

        if let Some(timeout) = builder.openai_connect_timeout
            && !(1..=300).contains(&timeout)
        {
            return Err("OpenAI connect timeout must be between 1 and 300 seconds".to_owned());
        }

        if let Some(timeout) = builder.openai_request_timeout
            && !(1..=600).contains(&timeout)
        {
            return Err("OpenAI request timeout must be between 1 and 600 seconds".to_owned());
        }

        let models = [
            ("chat", &builder.openai_chat_model),
            ("embedding", &builder.openai_embedding_model),
            ("realtime", &builder.openai_realtime_model),
        ];

        for (name, model) in models {
            if let Some(model) = model
                && model.trim().is_empty()
            {
                return Err(format!("OpenAI {name} model cannot be empty"));
            }
        }

        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            openai_base_url: defaults::OPENAI_BASE_URL.to_owned(),
            openai_connect_timeout: defaults::OPENAI_CONNECT_TIMEOUT_SECS,
            openai_request_timeout: defaults::OPENAI_REQUEST_TIMEOUT_SECS,
            openai_chat_model: defaults::OPENAI_CHAT_MODEL.to_owned(),
            openai_embedding_model: defaults::OPENAI_EMBEDDING_MODEL.to_owned(),
            openai_realtime_model: defaults::OPENAI_REALTIME_MODEL.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = ServiceConfig::builder()
            .with_openai_base_url("http://127.0.0.1:9000/v1")
            .build()
            .unwrap();

        assert_eq!(config.openai_base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.openai_chat_model, defaults::OPENAI_CHAT_MODEL);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn builder_rejects_invalid_values() {
        assert!(
            ServiceConfig::builder()
                .with_openai_base_url("nats://localhost")
                .build()
                .is_err()
        );
        assert!(
            ServiceConfig::builder()
                .with_openai_connect_timeout(0u64)
                .build()
                .is_err()
        );
        assert!(
            ServiceConfig::builder()
                .with_openai_embedding_model(" ")
                .build()
                .is_err()
        );
    }

    #[test]
    fn default_config_connects() {
        let client = ServiceConfig::default().connect_openai().unwrap();
        assert_eq!(
            client.config().effective_base_url(),
            defaults::OPENAI_BASE_URL
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn parses_from_cli_args() {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[clap(flatten)]
            service: ServiceConfig,
        }

        let cli = Cli::parse_from(["hub", "--openai-chat-model", "gpt-4.1"]);
        assert_eq!(cli.service.openai_chat_model, "gpt-4.1");
        assert_eq!(cli.service.openai_base_url, defaults::OPENAI_BASE_URL);
    }
}
