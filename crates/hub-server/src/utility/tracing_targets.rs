//! Tracing target constants shared by middleware.
//!
//! Handlers define their own `TRACING_TARGET` next to the code that logs.

/// Request metrics and timing.
pub const TRACING_TARGET_METRICS: &str = "hub_server::metrics";

/// Middleware errors and request timeouts.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "hub_server::recovery::error";

/// Handler panics.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "hub_server::recovery::panic";

/// Service state construction.
pub const TRACING_TARGET_SERVICE: &str = "hub_server::service";

/// Upstream error translation.
pub const TRACING_TARGET_UPSTREAM: &str = "hub_server::upstream";
