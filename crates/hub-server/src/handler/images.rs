//! Image generation, optionally guided by reference pictures.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{DefaultBodyLimit, FromRequest, Request, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use hub_openai::{ImageRequest, OpenAiClient};
use jiff::Timestamp;

use crate::extract::{Json, MAX_FILE_SIZE, Multipart, OpenAiKey, UploadedFile};
use crate::handler::request::{ImageGenerateRequest, MAX_IMAGE_REFERENCES};
use crate::handler::response::{ErrorResponse, GeneratedImage, GeneratedImages};
use crate::handler::{Error, ErrorKind, Result};
use crate::middleware::MAX_UPLOAD_BODY_SIZE;
use crate::service::ServiceState;

/// Tracing target for image operations.
const TRACING_TARGET: &str = "hub_server::handler::images";

/// Image model used for every call.
const IMAGE_MODEL: &str = "gpt-image-1";

/// Form field carrying reference pictures.
const REFERENCES_FIELD: &str = "references";

/// Image generation input: a JSON body, or a multipart form with optional
/// `references` files.
#[derive(Debug)]
struct ImageInput {
    request: ImageGenerateRequest,
    references: Vec<UploadedFile>,
}

impl<S> FromRequest<S> for ImageInput
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        if is_json {
            let Json(request) = Json::<ImageGenerateRequest>::from_request(req, state).await?;
            return Ok(Self {
                request,
                references: Vec::new(),
            });
        }

        let form = Multipart::from_request(req, state)
            .await?
            .read_form(MAX_FILE_SIZE)
            .await?;

        let request = ImageGenerateRequest::from_fields(|name| form.text(name).map(str::to_owned));
        let references = form
            .files
            .into_iter()
            .filter(|file| file.field == REFERENCES_FIELD && !file.data.is_empty())
            .take(MAX_IMAGE_REFERENCES)
            .collect();

        Ok(Self {
            request,
            references,
        })
    }
}

impl aide::OperationInput for ImageInput {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<ImageGenerateRequest>::operation_input(ctx, operation);
    }
}

/// Appends a description of the reference pictures to the prompt.
///
/// The first picture is the model photo, the rest are garment references.
fn reference_prompt(prompt: &str, references: &[UploadedFile]) -> String {
    let summary: Vec<String> = references
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let role = match index {
                0 => "Model photo".to_owned(),
                n => format!("Garment reference {n}"),
            };
            let name = match file.filename.as_str() {
                "" => "unnamed file",
                name => name,
            };
            let kind = file.content_type.as_deref().unwrap_or("unknown/unknown");
            format!("- {role}: {name} ({kind})")
        })
        .collect();

    format!(
        "{prompt}\n\nREFERENCE MATERIAL (internal):\n{}\nRespect the subject's facial identity, \
         pose, and proportions while faithfully applying garment textures, colors, and materials \
         from the references. Do not mention this section in your response.",
        summary.join("\n")
    )
}

/// Generates image variants, switching to reference-guided edits when
/// pictures are attached.
#[tracing::instrument(skip_all, fields(references = input.references.len()))]
async fn generate_images(
    State(openai): State<OpenAiClient>,
    OpenAiKey(api_key): OpenAiKey,
    input: ImageInput,
) -> Result<(StatusCode, Json<GeneratedImages>)> {
    let ImageInput {
        request,
        references,
    } = input;

    let prompt = request
        .prompt()
        .ok_or_else(|| ErrorKind::InvalidPrompt.into_error())?;
    let output_format = request.output_format();

    let mut upstream_request = ImageRequest {
        model: IMAGE_MODEL.to_owned(),
        prompt,
        n: request.versions(),
        size: request.size(),
        quality: request.quality(),
        background: request.background(),
        output_format: output_format.clone(),
    };

    tracing::debug!(
        target: TRACING_TARGET,
        n = upstream_request.n,
        size = %upstream_request.size,
        "Generating images"
    );

    let created_at = Timestamp::now();
    let response = if references.is_empty() {
        openai.generate_images(&api_key, &upstream_request).await?
    } else {
        upstream_request.prompt = reference_prompt(&upstream_request.prompt, &references);
        let parts = references
            .into_iter()
            .map(UploadedFile::into_file_part)
            .collect();
        openai.edit_images(&api_key, upstream_request, parts).await?
    };

    let items: Vec<_> = response
        .data
        .into_iter()
        .enumerate()
        .map(|(index, data)| {
            GeneratedImage::new(index, data, output_format.as_deref(), IMAGE_MODEL, created_at)
        })
        .collect();

    tracing::info!(target: TRACING_TARGET, images = items.len(), "Images generated");

    Ok((
        StatusCode::OK,
        Json(GeneratedImages {
            items,
            model: IMAGE_MODEL.to_owned(),
        }),
    ))
}

fn generate_images_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Generate images")
        .description(
            "Generates up to four image variants. Accepts JSON, or multipart form data \
             with up to three `references` pictures that guide the result.",
        )
        .response::<200, Json<GeneratedImages>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<413, Json<ErrorResponse>>()
        .response::<502, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/images/generate",
            post_with(generate_images, generate_images_docs),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_SIZE))
        .with_path_items(|item| item.tag("Images"))
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::reference_prompt;
    use crate::extract::UploadedFile;
    use crate::handler::test::create_test_server_with_upstream;

    const KEY: &str = "sk-test";

    fn upload(filename: &str, content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            field: "references".to_owned(),
            filename: filename.to_owned(),
            content_type: content_type.map(str::to_owned),
            data: Bytes::from_static(b"img"),
        }
    }

    #[test]
    fn reference_prompt_lists_each_picture() {
        let prompt = reference_prompt(
            "Put the coat on the model",
            &[upload("model.jpg", Some("image/jpeg")), upload("", None)],
        );

        assert!(prompt.starts_with(
            "Put the coat on the model\n\nREFERENCE MATERIAL (internal):\n\
             - Model photo: model.jpg (image/jpeg)\n\
             - Garment reference 1: unnamed file (unknown/unknown)\n\
             Respect the subject's facial identity"
        ));
        assert!(prompt.ends_with("Do not mention this section in your response."));
    }

    #[tokio::test]
    async fn json_requests_generate_images() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({
                "model": "gpt-image-1",
                "prompt": "a blue cube",
                "n": 2,
                "size": "512x512",
                "quality": "auto",
                "output_format": "webp"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1_700_000_000,
                "data": [
                    { "b64_json": "QUJD" },
                    { "url": "https://cdn.example.com/2.webp" }
                ]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/images/generate")
            .add_header("X-OPENAI-KEY", KEY)
            .json(&json!({
                "prompt": "  a blue cube ",
                "size": "512x512",
                "versions": 2,
                "outputFormat": "webp",
                "background": "undefined"
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["model"], "gpt-image-1");
        assert_eq!(body["items"][0]["previewUrl"], "data:image/webp;base64,QUJD");
        assert_eq!(body["items"][1]["previewUrl"], "https://cdn.example.com/2.webp");
        assert!(body["items"][1]["id"].as_str().unwrap_or_default().starts_with("img_1_"));
        Ok(())
    }

    #[tokio::test]
    async fn references_switch_to_edits() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/edits"))
            .and(body_string_contains("REFERENCE MATERIAL (internal)"))
            .and(body_string_contains("- Model photo: model.png (image/png)"))
            .and(body_string_contains("name=\"input_fidelity\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "b64_json": "QUJD" }]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let picture = |name: &str| {
            Part::bytes(b"PNGDATA".to_vec())
                .file_name(name)
                .mime_type("image/png")
        };
        let form = MultipartForm::new()
            .add_text("prompt", "Dress the model in the jacket")
            .add_text("versions", "1")
            .add_part("references", picture("model.png"))
            .add_part("references", picture("jacket.png"))
            .add_part("references", Part::bytes(Vec::new()).file_name("empty.png"));

        let response = server
            .post("/api/images/generate")
            .add_header("X-OPENAI-KEY", KEY)
            .multipart(form)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["items"][0]["previewUrl"], "data:image/png;base64,QUJD");
        Ok(())
    }

    #[tokio::test]
    async fn blank_prompts_are_rejected() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/images/generate")
            .add_header("X-OPENAI-KEY", KEY)
            .json(&json!({ "prompt": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["name"], "invalid_prompt");

        let form = MultipartForm::new().add_text("size", "1024x1024");
        let response = server
            .post("/api/images/generate")
            .add_header("X-OPENAI-KEY", KEY)
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["name"], "invalid_prompt");
        Ok(())
    }

    #[tokio::test]
    async fn upstream_failures_keep_their_status() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached" }
            })))
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/images/generate")
            .add_header("X-OPENAI-KEY", KEY)
            .json(&json!({ "prompt": "a cube" }))
            .await;

        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        Ok(())
    }
}
