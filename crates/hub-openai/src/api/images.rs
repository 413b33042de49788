//! Images API: generation and reference-guided edits.

use reqwest::Method;
use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};

use super::FilePart;
use crate::client::{ApiKey, OpenAiClient, ensure_success};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Body of a `POST /images/generations` call.
///
/// Edits send the same fields as multipart text parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub n: u8,
    pub size: String,
    pub quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl ImageRequest {
    fn into_form(self) -> Form {
        let mut form = Form::new()
            .text("model", self.model)
            .text("prompt", self.prompt)
            .text("n", self.n.to_string())
            .text("size", self.size)
            .text("quality", self.quality)
            .text("input_fidelity", "high");

        if let Some(background) = self.background {
            form = form.text("background", background);
        }
        if let Some(output_format) = self.output_format {
            form = form.text("output_format", output_format);
        }
        form
    }
}

/// One generated image: either a hosted URL or inline base64 data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64_json: Option<String>,
}

/// Result of a generation or edit call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub data: Vec<ImageData>,
}

impl OpenAiClient {
    /// Generates images from a prompt.
    pub async fn generate_images(
        &self,
        key: &ApiKey,
        request: &ImageRequest,
    ) -> Result<ImagesResponse> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            n = request.n,
            size = %request.size,
            "Generating images"
        );

        let response = self
            .timed_request(Method::POST, "images/generations", key)
            .json(request)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    /// Generates images guided by reference pictures.
    pub async fn edit_images(
        &self,
        key: &ApiKey,
        request: ImageRequest,
        references: Vec<FilePart>,
    ) -> Result<ImagesResponse> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            model = %request.model,
            n = request.n,
            references = references.len(),
            "Editing images"
        );

        let mut form = request.into_form();
        for reference in references {
            form = form.part("image[]", reference.into_part()?);
        }

        let response = self
            .timed_request(Method::POST, "images/edits", key)
            .multipart(form)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn optional_fields_are_omitted() {
        let request = ImageRequest {
            model: "gpt-image-1".to_owned(),
            prompt: "a lighthouse".to_owned(),
            n: 2,
            size: "1024x1024".to_owned(),
            quality: "auto".to_owned(),
            background: None,
            output_format: Some("webp".to_owned()),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-image-1",
                "prompt": "a lighthouse",
                "n": 2,
                "size": "1024x1024",
                "quality": "auto",
                "output_format": "webp"
            })
        );
    }
}
