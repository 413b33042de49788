//! Image generation request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound for `versions`.
pub const MAX_IMAGE_VERSIONS: u8 = 4;

/// Maximum number of reference pictures forwarded upstream.
pub const MAX_IMAGE_REFERENCES: usize = 3;

/// Raw image generation fields, sent as JSON or as multipart text parts.
///
/// Every field is loosely typed; use the accessors for normalized values.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerateRequest {
    /// What to draw. Required.
    pub prompt: Option<String>,
    /// Output size, `1024x1024` by default.
    pub size: Option<String>,
    /// Number of variants, a number or numeric string clamped to 1..=4.
    pub versions: Option<Value>,
    /// Rendering quality, `auto` by default.
    pub quality: Option<String>,
    pub background: Option<String>,
    /// Encoding of the generated images, also used for preview URLs.
    pub output_format: Option<String>,
}

/// Trims a form value; empty, `undefined` and `null` count as absent.
pub fn normalize_string(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    match trimmed {
        "" | "undefined" | "null" => None,
        other => Some(other.to_owned()),
    }
}

impl ImageGenerateRequest {
    /// Builds a request from multipart text fields.
    pub fn from_fields(field: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            prompt: field("prompt"),
            size: field("size"),
            versions: field("versions").map(Value::String),
            quality: field("quality"),
            background: field("background"),
            output_format: field("outputFormat"),
        }
    }

    /// Returns the trimmed prompt, if any.
    pub fn prompt(&self) -> Option<String> {
        let prompt = self.prompt.as_deref()?.trim();
        (!prompt.is_empty()).then(|| prompt.to_owned())
    }

    pub fn size(&self) -> String {
        normalize_string(self.size.as_deref()).unwrap_or_else(|| "1024x1024".to_owned())
    }

    pub fn quality(&self) -> String {
        normalize_string(self.quality.as_deref()).unwrap_or_else(|| "auto".to_owned())
    }

    pub fn background(&self) -> Option<String> {
        normalize_string(self.background.as_deref())
    }

    pub fn output_format(&self) -> Option<String> {
        normalize_string(self.output_format.as_deref())
    }

    /// Returns the variant count; unreadable values count as one.
    pub fn versions(&self) -> u8 {
        let requested = match &self.versions {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|count| !count.is_nan() && *count != 0.0)
        .unwrap_or(1.0);

        requested.clamp(1.0, f64::from(MAX_IMAGE_VERSIONS)) as u8
    }
}
