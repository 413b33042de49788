//! Extractors whose rejections render as structured [`Error`] responses.
//!
//! [`Error`]: crate::handler::Error

mod enhanced_json;
mod enhanced_multipart;
mod enhanced_path;
mod validated_json;

pub use self::enhanced_json::Json;
pub use self::enhanced_multipart::{FormParts, MAX_FILE_SIZE, Multipart, UploadedFile};
pub use self::enhanced_path::Path;
pub use self::validated_json::ValidateJson;
