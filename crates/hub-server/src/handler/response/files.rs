//! File response types.

use hub_openai::FileObject;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An uploaded OpenAI file.
///
/// A missing or zero upstream `created_at` is reported as the current time.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    /// Identifier to pass as a knowledge `fileIds` entry.
    pub file_id: String,
    pub filename: String,
    /// Size in bytes.
    pub bytes: u64,
    pub created_at: Timestamp,
}

impl From<FileObject> for FileItem {
    fn from(file: FileObject) -> Self {
        let created_at = file
            .created_at
            .filter(|seconds| *seconds != 0)
            .and_then(|seconds| Timestamp::from_second(seconds).ok())
            .unwrap_or_else(Timestamp::now);

        Self {
            file_id: file.id,
            filename: file.filename,
            bytes: file.bytes,
            created_at,
        }
    }
}

/// Response of the file upload and listing routes.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileItems {
    pub items: Vec<FileItem>,
}

impl FromIterator<FileObject> for FileItems {
    fn from_iter<I: IntoIterator<Item = FileObject>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}
