//! Multipart extractor with structured rejections and bounded file reads.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use derive_more::{Deref, DerefMut, From};
use hub_openai::FilePart;

use crate::handler::{Error, ErrorKind, Result};

/// Tracing target for multipart parsing.
const TRACING_TARGET: &str = "hub_server::extract::multipart";

/// Maximum size of a single uploaded file: 25 MiB.
pub const MAX_FILE_SIZE: usize = 25 * 1024 * 1024;

/// A file part read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Form field the file was sent under.
    pub field: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    /// Converts the upload into a part for an upstream multipart call.
    pub fn into_file_part(self) -> FilePart {
        let part = FilePart::new(self.filename, self.data);
        match self.content_type {
            Some(content_type) => part.with_content_type(content_type),
            None => part,
        }
    }
}

/// Every part of a multipart form, files in arrival order.
#[derive(Debug, Clone, Default)]
pub struct FormParts {
    pub files: Vec<UploadedFile>,
    pub texts: HashMap<String, String>,
}

impl FormParts {
    /// Returns the files sent under `field`, in arrival order.
    pub fn files_named<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> {
        self.files.iter().filter(move |file| file.field == field)
    }

    /// Removes and returns the first file sent under `field`.
    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let position = self.files.iter().position(|file| file.field == field)?;
        Some(self.files.remove(position))
    }

    /// Returns a text field.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.texts.get(field).map(String::as_str)
    }
}

/// Drop-in replacement for [`axum::extract::Multipart`] whose rejections are [`Error`]s.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl Multipart {
    /// Returns the inner Axum Multipart extractor.
    #[inline]
    pub fn into_inner(self) -> AxumMultipart {
        self.0
    }

    /// Reads every part of the form.
    ///
    /// Parts with a filename are files and are buffered up to
    /// `max_file_size` bytes each; a larger file fails with
    /// `413 file_too_large` before any later part is read. Other parts are
    /// read as text, later values replacing earlier ones.
    pub async fn read_form(mut self, max_file_size: usize) -> Result<FormParts> {
        let mut form = FormParts::default();

        while let Some(field) = self.0.next_field().await.map_err(invalid_multipart)? {
            let name = field.name().unwrap_or_default().to_owned();

            let Some(filename) = field.file_name().map(str::to_owned) else {
                let value = field.text().await.map_err(invalid_multipart)?;
                form.texts.insert(name, value);
                continue;
            };

            let content_type = field.content_type().map(str::to_owned);
            let data = read_limited(field, &filename, max_file_size).await?;

            tracing::debug!(
                target: TRACING_TARGET,
                field = %name,
                filename = %filename,
                size = data.len(),
                "Received file part"
            );

            form.files.push(UploadedFile {
                field: name,
                filename,
                content_type,
                data,
            });
        }

        Ok(form)
    }
}

/// Buffers one file, stopping as soon as it grows past `limit`.
async fn read_limited(mut field: Field<'_>, filename: &str, limit: usize) -> Result<Bytes> {
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(invalid_multipart)? {
        if data.len() + chunk.len() > limit {
            tracing::warn!(
                target: TRACING_TARGET,
                filename = %filename,
                limit,
                "Rejecting oversized file"
            );

            return Err(ErrorKind::FileTooLarge
                .with_resource("file")
                .with_context(format!(
                    "File '{}' exceeds the maximum size of {} MB",
                    filename,
                    limit / (1024 * 1024)
                )));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(data))
}

fn invalid_multipart(err: MultipartError) -> Error<'static> {
    tracing::error!(target: TRACING_TARGET, error = %err, "Failed to read multipart field");
    ErrorKind::BadRequest
        .with_message("Invalid multipart data")
        .with_context(format!("Failed to parse multipart form: {}", err))
}

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumMultipart::from_request(req, state)
            .await
            .map(Multipart)
            .map_err(Into::into)
    }
}

impl From<MultipartRejection> for Error<'static> {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => ErrorKind::BadRequest
                .with_message("Invalid multipart boundary")
                .with_context(
                    "The Content-Type header is missing or has an invalid boundary parameter. \
                     Ensure the request uses 'multipart/form-data' with a valid boundary.",
                ),
            _ => ErrorKind::BadRequest
                .with_message("Invalid multipart request")
                .with_context(format!("Multipart parsing failed: {}", rejection)),
        }
    }
}

impl aide::OperationInput for Multipart {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumMultipart::operation_input(ctx, operation);
    }
}
