//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, OpenAPI, recovery/timeouts
//! └── service: ServiceConfig       # OpenAI endpoint, timeouts, default models
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! hub --port 8080 --openai-chat-model gpt-4.1
//!
//! # Or via environment variables
//! PORT=8080 OPENAI_CHAT_MODEL=gpt-4.1 hub
//! ```

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use hub_server::service::ServiceConfig;
pub use middleware::MiddlewareConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the hub:
/// - [`ServerConfig`]: Network binding and shutdown
/// - [`MiddlewareConfig`]: HTTP middleware (CORS, OpenAPI, recovery)
/// - [`ServiceConfig`]: OpenAI endpoint and default models
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "hub")]
#[command(about = "OpenAI API demo hub server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// OpenAI client configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Validates all configuration values.
    ///
    /// The service configuration is validated again when the OpenAI client
    /// is built; checking it here fails fast with a clearer message.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;

        let _ = ServiceConfig::builder()
            .with_openai_base_url(self.service.openai_base_url.clone())
            .with_openai_connect_timeout(self.service.openai_connect_timeout)
            .with_openai_request_timeout(self.service.openai_request_timeout)
            .with_openai_chat_model(self.service.openai_chat_model.clone())
            .with_openai_embedding_model(self.service.openai_embedding_model.clone())
            .with_openai_realtime_model(self.service.openai_realtime_model.clone())
            .build()
            .context("invalid service configuration")?;

        Ok(())
    }

    /// Logs configuration at info level. No key material is ever part of it.
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            base_url = %self.service.openai_base_url,
            connect_timeout_secs = self.service.openai_connect_timeout,
            request_timeout_secs = self.service.openai_request_timeout,
            chat_model = %self.service.openai_chat_model,
            embedding_model = %self.service.openai_embedding_model,
            realtime_model = %self.service.openai_realtime_model,
            "OpenAI configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
