//! Typed wrappers over the OpenAI endpoints the hub calls.

mod audio;
mod embeddings;
mod files;
mod images;
mod realtime;
mod responses;
mod videos;

pub use audio::{SpeechRequest, Transcription};
pub use embeddings::EmbeddingInput;
pub use files::{ASSISTANTS_PURPOSE, FileObject, FilePart};
pub use images::{ImageData, ImageRequest, ImagesResponse};
pub use realtime::{RealtimeSessionRequest, UpstreamResponse};
pub use responses::{
    InputMessage, MessageRole, OutputContent, OutputItem, ResponseObject, ResponseRequest,
    ResponseStream,
};
pub use videos::{VideoJob, VideoRequest};
