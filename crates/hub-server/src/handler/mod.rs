//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! Every route is mounted under `/api`:
//!
//! | Method | Path                                  |
//! |--------|---------------------------------------|
//! | POST   | `/api/support/chat`                   |
//! | POST   | `/api/embeddings/index`               |
//! | POST   | `/api/embeddings/search`              |
//! | GET    | `/api/embeddings/corpora/{id}`        |
//! | POST   | `/api/knowledge/ask`                  |
//! | POST   | `/api/files/upload`                   |
//! | GET    | `/api/files/list`                     |
//! | POST   | `/api/structured/run`                 |
//! | POST   | `/api/images/generate`                |
//! | POST   | `/api/video/generate`                 |
//! | GET    | `/api/video/jobs/{jobId}`             |
//! | GET    | `/api/video/jobs/{jobId}/content`     |
//! | POST   | `/api/realtime/token`                 |
//! | POST   | `/api/realtime/transcribe`            |
//! | POST   | `/api/realtime/respond`               |
//! | POST   | `/api/mcp/chat`                       |
//! | GET    | `/api/connectors/ping`                |
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use hub_server::handler::routes;
//! use hub_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use hub_server::service::{ServiceConfig, ServiceState};
//!
//! # fn example() -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&ServiceConfig::default())?;
//! let app: axum::Router = routes()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod embeddings;
mod error;
mod files;
mod images;
mod knowledge;
mod mcp;
mod monitors;
mod realtime;
pub mod request;
pub mod response;
mod structured;
mod support_chat;
mod videos;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
pub use crate::handler::structured::StructuredSchema;
use crate::service::ServiceState;

/// Path prefix shared by every route.
pub const API_PREFIX: &str = "/api";

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes mounted under [`API_PREFIX`].
pub fn routes() -> ApiRouter<ServiceState> {
    let api = ApiRouter::new()
        .merge(support_chat::routes())
        .merge(embeddings::routes())
        .merge(knowledge::routes())
        .merge(files::routes())
        .merge(structured::routes())
        .merge(images::routes())
        .merge(videos::routes())
        .merge(realtime::routes())
        .merge(mcp::routes())
        .merge(monitors::routes());

    ApiRouter::new().nest(API_PREFIX, api).fallback(handler)
}
