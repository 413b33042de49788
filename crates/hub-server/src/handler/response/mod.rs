//! Response types for HTTP handlers.

mod embeddings;
mod errors;
mod files;
mod images;
mod knowledge;
mod mcp;
mod monitors;
mod realtime;
mod structured;
mod videos;

pub use embeddings::*;
pub use errors::*;
pub use files::*;
pub use images::*;
pub use knowledge::*;
pub use mcp::*;
pub use monitors::*;
pub use realtime::*;
pub use structured::*;
pub use videos::*;
