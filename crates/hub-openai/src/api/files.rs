//! Files API.

use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::{ApiKey, OpenAiClient, ensure_success};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Purpose the hub uploads and lists files under.
pub const ASSISTANTS_PURPOSE: &str = "assistants";

/// A file held in memory, ready to be sent as a multipart part.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FilePart {
    /// Creates a part without an explicit content type.
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Sets the content type sent with the part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Returns the size of the content in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the part has no content.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn into_part(self) -> Result<Part> {
        let length = self.data.len() as u64;
        let part = Part::stream_with_length(self.data, length).file_name(self.filename);

        match self.content_type {
            Some(content_type) => Ok(part.mime_str(&content_type)?),
            None => Ok(part),
        }
    }
}

/// An uploaded file as described by the Files API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub bytes: u64,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub purpose: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    data: Vec<FileObject>,
}

impl OpenAiClient {
    /// Downloads the content of an uploaded file as text.
    pub async fn file_content(&self, key: &ApiKey, file_id: &str) -> Result<String> {
        tracing::debug!(target: TRACING_TARGET_CLIENT, file_id, "Fetching file content");

        let path = format!("files/{file_id}/content");
        let response = self
            .timed_request(Method::GET, &path, key)
            .send()
            .await?;

        Ok(ensure_success(response).await?.text().await?)
    }

    /// Uploads one file under `purpose`.
    pub async fn upload_file(
        &self,
        key: &ApiKey,
        file: FilePart,
        purpose: &str,
    ) -> Result<FileObject> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            filename = %file.filename,
            size = file.len(),
            purpose,
            "Uploading file"
        );

        let form = Form::new()
            .text("purpose", purpose.to_owned())
            .part("file", file.into_part()?);

        let response = self
            .timed_request(Method::POST, "files", key)
            .multipart(form)
            .send()
            .await?;

        let object = ensure_success(response).await?.json::<FileObject>().await?;

        tracing::debug!(target: TRACING_TARGET_CLIENT, file_id = %object.id, "File uploaded");
        Ok(object)
    }

    /// Lists the files uploaded under `purpose`.
    pub async fn list_files(&self, key: &ApiKey, purpose: &str) -> Result<Vec<FileObject>> {
        tracing::debug!(target: TRACING_TARGET_CLIENT, purpose, "Listing files");

        let response = self
            .timed_request(Method::GET, "files", key)
            .query(&[("purpose", purpose)])
            .send()
            .await?;

        let list = ensure_success(response).await?.json::<FileList>().await?;
        Ok(list.data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn file_object_tolerates_missing_fields() {
        let file: FileObject = serde_json::from_value(json!({ "id": "file-1" })).unwrap();
        assert_eq!(file.id, "file-1");
        assert_eq!(file.bytes, 0);
        assert!(file.created_at.is_none());
    }

    #[test]
    fn file_part_reports_size() {
        let part = FilePart::new("notes.txt", Bytes::from_static(b"hello"))
            .with_content_type("text/plain");
        assert_eq!(part.len(), 5);
        assert!(!part.is_empty());
        assert!(part.into_part().is_ok());
    }
}
