//! Request extractors.
//!
//! - [`OpenAiKey`]: the caller's OpenAI key from `X-OPENAI-KEY`
//! - [`Json`], [`ValidateJson`], [`Path`], [`Multipart`]: axum extractors
//!   with structured `400` rejections

mod openai_key;
pub mod reject;

pub use crate::extract::openai_key::{OPENAI_KEY_HEADER, OpenAiKey};
pub use crate::extract::reject::{
    FormParts, Json, MAX_FILE_SIZE, Multipart, Path, UploadedFile, ValidateJson,
};
