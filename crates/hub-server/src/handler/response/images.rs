//! Image generation response types.

use hub_openai::ImageData;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One generated image.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Opaque per-response identifier, `img_{index}_{suffix}`.
    pub id: String,
    /// Hosted URL, or a `data:` URL when the image came back inline.
    pub preview_url: Option<String>,
    pub created_at: Timestamp,
    pub model: String,
}

impl GeneratedImage {
    /// Builds the preview for the `index`-th upstream image.
    ///
    /// Inline data is labelled `image/{output_format}`, `image/png` by default.
    pub fn new(
        index: usize,
        data: ImageData,
        output_format: Option<&str>,
        model: &str,
        created_at: Timestamp,
    ) -> Self {
        let preview_url = match data.b64_json {
            Some(encoded) => {
                let format = output_format.unwrap_or("png");
                Some(format!("data:image/{format};base64,{encoded}"))
            }
            None => data.url,
        };

        Self {
            id: format!("img_{}_{}", index, Uuid::now_v7().simple()),
            preview_url,
            created_at,
            model: model.to_owned(),
        }
    }
}

/// Response of the image generation route.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImages {
    pub items: Vec<GeneratedImage>,
    pub model: String,
}
