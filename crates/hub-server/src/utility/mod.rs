//! Shared helpers for routing and logging.

mod route_category;
pub mod tracing_targets;

pub use route_category::RouteCategory;
