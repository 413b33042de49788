//! Video generation request types.

use std::str::FromStr;

use hub_openai::VideoRequest;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::handler::{ErrorKind, Result};

/// Video models the hub allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum VideoModel {
    #[default]
    #[strum(serialize = "sora-2")]
    Sora2,
    #[strum(serialize = "sora-2-pro")]
    Sora2Pro,
}

/// Clip lengths the hub allows, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum VideoSeconds {
    #[strum(serialize = "4")]
    Four,
    #[default]
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "12")]
    Twelve,
}

/// Frame sizes the hub allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum VideoSize {
    #[strum(serialize = "720x1280")]
    Portrait,
    #[default]
    #[strum(serialize = "1280x720")]
    Landscape,
    #[strum(serialize = "1024x1792")]
    TallPortrait,
    #[strum(serialize = "1792x1024")]
    WideLandscape,
}

/// Downloadable renditions of a finished video job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum VideoVariant {
    #[default]
    Video,
    Thumbnail,
    Spritesheet,
}

impl VideoVariant {
    /// Content type assumed when the upstream sends none.
    pub fn fallback_content_type(self) -> &'static str {
        match self {
            Self::Thumbnail => "image/png",
            Self::Video | Self::Spritesheet => "video/mp4",
        }
    }
}

/// Parses `value`, falling back to the default for anything not allowed.
fn allowed_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|value| value.parse().ok()).unwrap_or_default()
}

/// Request payload for starting a video job.
///
/// Unsupported `model`, `seconds` and `size` values fall back to their
/// defaults instead of failing.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoGenerateRequest {
    /// What to render. Required.
    pub prompt: Option<String>,
    /// `sora-2` (default) or `sora-2-pro`.
    pub model: Option<String>,
    /// Clip length, `4`, `8` (default) or `12`, as a number or string.
    pub seconds: Option<Value>,
    /// Frame size, `1280x720` by default.
    pub size: Option<String>,
}

impl VideoGenerateRequest {
    pub fn model(&self) -> VideoModel {
        allowed_or_default(self.model.as_deref())
    }

    pub fn seconds(&self) -> VideoSeconds {
        match &self.seconds {
            Some(Value::Number(number)) => allowed_or_default(Some(&number.to_string())),
            Some(Value::String(text)) => allowed_or_default(Some(text)),
            _ => VideoSeconds::default(),
        }
    }

    pub fn size(&self) -> VideoSize {
        allowed_or_default(self.size.as_deref())
    }

    /// Builds the upstream job parameters; a blank prompt is `invalid_prompt`.
    pub fn to_video_request(&self) -> Result<VideoRequest> {
        let prompt = self
            .prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .ok_or_else(|| ErrorKind::InvalidPrompt.with_message("Prompt is required."))?;

        Ok(VideoRequest {
            prompt: prompt.to_owned(),
            model: self.model().to_string(),
            seconds: self.seconds().to_string(),
            size: self.size().to_string(),
        })
    }
}

/// Path parameters for job-scoped video routes.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoJobPathParams {
    /// Job identifier returned by the generate route.
    pub job_id: String,
}

impl VideoJobPathParams {
    /// Returns the job id if it is safe to place in an upstream path.
    pub fn job_id(&self) -> Result<&str> {
        let valid = !self.job_id.is_empty()
            && self
                .job_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if valid {
            Ok(&self.job_id)
        } else {
            Err(ErrorKind::BadRequest
                .with_message("Invalid job id")
                .with_context("Job ids contain only letters, digits, '_' and '-'"))
        }
    }
}

/// Query of the video content route.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VideoContentQuery {
    /// `video` (default), `thumbnail` or `spritesheet`.
    pub variant: Option<String>,
}

impl VideoContentQuery {
    /// Returns the requested variant; an empty value means `video`.
    pub fn variant(&self) -> Result<VideoVariant> {
        match self.variant.as_deref() {
            None | Some("") => Ok(VideoVariant::default()),
            Some(value) => value
                .parse()
                .map_err(|_| ErrorKind::InvalidVariant.into_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(value: Value) -> VideoGenerateRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_apply() {
        let upstream = request(json!({ "prompt": " a running dog " }))
            .to_video_request()
            .unwrap();

        assert_eq!(upstream.prompt, "a running dog");
        assert_eq!(upstream.model, "sora-2");
        assert_eq!(upstream.seconds, "8");
        assert_eq!(upstream.size, "1280x720");
    }

    #[test]
    fn unsupported_values_fall_back() {
        let request = request(json!({
            "prompt": "waves",
            "model": "sora-3",
            "seconds": 30,
            "size": "640x480"
        }));

        assert_eq!(request.model(), VideoModel::Sora2);
        assert_eq!(request.seconds(), VideoSeconds::Eight);
        assert_eq!(request.size(), VideoSize::Landscape);
    }

    #[test]
    fn numeric_and_string_seconds_are_accepted() {
        assert_eq!(request(json!({ "seconds": 12 })).seconds(), VideoSeconds::Twelve);
        assert_eq!(request(json!({ "seconds": "4" })).seconds(), VideoSeconds::Four);
        assert_eq!(
            request(json!({ "model": "sora-2-pro", "size": "1024x1792" })).size(),
            VideoSize::TallPortrait
        );
    }

    #[test]
    fn blank_prompt_is_invalid() {
        let err = request(json!({ "prompt": "  " })).to_video_request().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPrompt);
    }

    #[test]
    fn job_ids_are_restricted() {
        let params = |id: &str| VideoJobPathParams {
            job_id: id.to_owned(),
        };

        assert_eq!(params("video_68d-1").job_id().unwrap(), "video_68d-1");
        assert!(params("../files").job_id().is_err());
        assert!(params("a b").job_id().is_err());
    }

    #[test]
    fn variants_parse() {
        let query = |variant: Option<&str>| VideoContentQuery {
            variant: variant.map(str::to_owned),
        };

        assert_eq!(query(None).variant().unwrap(), VideoVariant::Video);
        assert_eq!(query(Some("")).variant().unwrap(), VideoVariant::Video);
        assert_eq!(query(Some("thumbnail")).variant().unwrap(), VideoVariant::Thumbnail);
        assert_eq!(
            query(Some("poster")).variant().unwrap_err().kind(),
            ErrorKind::InvalidVariant
        );
    }
}
