#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod index;
mod record;
mod similarity;

pub use crate::index::VectorIndex;
pub use crate::record::{ScoredRecord, VectorRecord};
pub use crate::similarity::cosine_similarity;

/// Tracing target for vector index operations.
pub const TRACING_TARGET: &str = "hub_vector";
