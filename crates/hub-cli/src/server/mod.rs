//! HTTP server startup and lifecycle management.

mod error;
mod http_server;
mod shutdown;

pub use error::{ServerError, ServerResult as Result};
pub use http_server::serve;
use shutdown::shutdown_signal;
