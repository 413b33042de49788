//! Request types for HTTP handlers.

mod embeddings;
mod images;
mod knowledge;
mod mcp;
mod paths;
mod realtime;
mod structured;
mod support;
mod videos;

pub use embeddings::*;
pub use images::*;
pub use knowledge::*;
pub use mcp::*;
pub use paths::*;
pub use realtime::*;
pub use structured::*;
pub use support::*;
pub use videos::*;
