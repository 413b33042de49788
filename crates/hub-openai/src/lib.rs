#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod api;
mod client;
mod error;

pub mod stream;

pub use crate::api::{
    ASSISTANTS_PURPOSE, EmbeddingInput, FileObject, FilePart, ImageData, ImageRequest,
    ImagesResponse, InputMessage, MessageRole, OutputContent, OutputItem, RealtimeSessionRequest,
    ResponseObject, ResponseRequest, ResponseStream, SpeechRequest, Transcription,
    UpstreamResponse, VideoJob, VideoRequest,
};
pub use crate::client::{ApiKey, OpenAiClient, OpenAiConfig, OpenAiConfigBuilder};
pub use crate::error::{Error, Result};

/// Tracing target for client operations.
pub const TRACING_TARGET_CLIENT: &str = "hub_openai::client";

/// Tracing target for stream relay operations.
pub const TRACING_TARGET_STREAM: &str = "hub_openai::stream";
