//! Middleware for `axum::Router` and HTTP request processing.
//!
//! - Recovery: panics, timeouts and middleware errors become JSON errors
//! - Observability: request ids, trace spans, per-category metrics
//! - Security: CORS, security headers, body limits, compression
//! - Specification: OpenAPI JSON and the Scalar reference UI
//!
//! ```rust,no_run
//! use aide::axum::ApiRouter;
//! use hub_server::middleware::*;
//!
//! let app: axum::Router = ApiRouter::new()
//!     .with_open_api(OpenApiConfig::default())
//!     .with_default_security()
//!     .with_observability()
//!     .with_metrics()
//!     .with_default_recovery();
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{RouterObservabilityExt, track_categorized_metrics};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, DEFAULT_MAX_BODY_SIZE, FrameOptions, MAX_UPLOAD_BODY_SIZE, ReferrerPolicy,
    RouterSecurityExt, SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
