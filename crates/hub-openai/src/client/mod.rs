//! OpenAI client, credentials and configuration.

mod api_key;
mod openai_client;
mod openai_config;

pub use api_key::ApiKey;
pub(crate) use openai_client::ensure_success;
pub use openai_client::OpenAiClient;
pub use openai_config::{OpenAiConfig, OpenAiConfigBuilder};
