//! Streaming support chat.
//!
//! `POST /support/chat` relays an OpenAI Responses stream to the browser as
//! Server-Sent Events. Every frame is one JSON object:
//! - `{"delta": "..."}`: incremental output text
//! - `{"done": true}`: the response completed; the stream closes after it
//! - `{"error": "stream_parse_error", "detail": "..."}`: an upstream frame
//!   could not be parsed; relaying continues
//!
//! Clients cancel generation by closing the connection, which drops the
//! upstream body.

use std::convert::Infallible;

use aide::axum::ApiRouter;
use axum::extract::State;
use axum::http::header::{CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use hub_openai::stream::RelayEvent;
use hub_openai::{OpenAiClient, ResponseRequest};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::extract::{OpenAiKey, ValidateJson};
use crate::handler::Result;
use crate::handler::request::SupportChatRequest;
use crate::service::{ServiceConfig, ServiceState};

/// Tracing target for support chat operations.
const TRACING_TARGET: &str = "hub_server::handler::support_chat";

/// Number of events buffered between the relay task and the response body.
const RELAY_BUFFER: usize = 32;

/// Returns an upstream error status and body unchanged.
pub(crate) fn upstream_passthrough(status: StatusCode, body: String) -> Response {
    (
        status,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}

/// Forwards relay events as SSE frames until the stream ends, a `done`
/// event is sent, or the receiver goes away.
///
/// Returns the number of frames delivered. `events` is dropped on return,
/// which closes the upstream body.
async fn relay<S>(events: S, tx: mpsc::Sender<Result<Event, Infallible>>) -> usize
where
    S: Stream<Item = RelayEvent> + Send + 'static,
{
    let mut events = std::pin::pin!(events);
    let mut relayed = 0usize;

    loop {
        let event = tokio::select! {
            _ = tx.closed() => {
                tracing::info!(
                    target: TRACING_TARGET,
                    relayed,
                    "Client disconnected, cancelling support chat stream"
                );
                break;
            }
            next = events.next() => match next {
                Some(event) => event,
                None => break,
            },
        };

        let is_done = event.is_done();
        let sse_event = match Event::default().json_data(&event) {
            Ok(sse_event) => sse_event,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Failed to serialize relay event"
                );
                continue;
            }
        };

        if tx.send(Ok(sse_event)).await.is_err() {
            tracing::info!(
                target: TRACING_TARGET,
                relayed,
                "Client disconnected, cancelling support chat stream"
            );
            break;
        }

        relayed += 1;
        if is_done {
            break;
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        relayed,
        "Support chat stream finished"
    );
    relayed
}

/// Streams a support agent reply as Server-Sent Events.
#[tracing::instrument(skip_all, fields(escalate = request.escalate))]
async fn support_chat(
    State(openai): State<OpenAiClient>,
    State(config): State<ServiceConfig>,
    OpenAiKey(api_key): OpenAiKey,
    ValidateJson(request): ValidateJson<SupportChatRequest>,
) -> Result<Response> {
    let instructions = request.instructions();
    let model = request
        .model
        .unwrap_or_else(|| config.openai_chat_model.clone());

    tracing::debug!(
        target: TRACING_TARGET,
        model = %model,
        messages = request.messages.len(),
        "Opening support chat stream"
    );

    let upstream_request = ResponseRequest::new(model, request.messages)
        .with_instructions(instructions)
        .streaming();

    let upstream = match openai.stream_response(&api_key, &upstream_request).await {
        Ok(upstream) => upstream,
        Err(hub_openai::Error::Upstream { status, body }) => {
            tracing::warn!(
                target: TRACING_TARGET,
                status = status.as_u16(),
                "Upstream rejected support chat, passing through"
            );
            return Ok(upstream_passthrough(status, body));
        }
        Err(err) => return Err(err.into()),
    };

    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(RELAY_BUFFER);

    tokio::spawn(relay(upstream.into_events(), tx));

    let headers = [(CONNECTION, HeaderValue::from_static("keep-alive"))];
    Ok((headers, Sse::new(ReceiverStream::new(rx))).into_response())
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        // SSE endpoint - uses regular axum routing as aide doesn't support SSE in OpenAPI
        .route("/support/chat", axum::routing::post(support_chat))
        .with_path_items(|item| item.tag("Support"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use axum::http::StatusCode;
    use futures::{future, stream};
    use hub_openai::stream::RelayEvent;
    use serde_json::json;
    use tokio::sync::mpsc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{RELAY_BUFFER, relay};
    use crate::handler::test::{create_test_server_with_upstream, sse_payloads};

    const KEY: &str = "sk-test";

    /// Sets its flag when dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn closing_the_receiver_drops_the_event_stream() -> anyhow::Result<()> {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(Arc::clone(&dropped));

        // One delta, then an upstream that never sends again.
        let events = stream::unfold((flag, false), |(flag, sent)| async move {
            if sent {
                future::pending::<()>().await;
            }
            Some((RelayEvent::delta("a"), (flag, true)))
        });

        let (tx, mut rx) = mpsc::channel(RELAY_BUFFER);
        let task = tokio::spawn(relay(events, tx));

        assert!(rx.recv().await.is_some());
        drop(rx);

        let relayed = tokio::time::timeout(Duration::from_secs(5), task).await??;
        assert_eq!(relayed, 1);
        assert!(dropped.load(Ordering::SeqCst));
        Ok(())
    }

    #[tokio::test]
    async fn relay_stops_after_done() -> anyhow::Result<()> {
        let events = stream::iter([
            RelayEvent::delta("a"),
            RelayEvent::done(),
            RelayEvent::delta("late"),
        ]);

        let (tx, mut rx) = mpsc::channel(RELAY_BUFFER);
        let relayed = relay(events, tx).await;
        assert_eq!(relayed, 2);

        let mut frames = 0;
        while rx.recv().await.is_some() {
            frames += 1;
        }
        assert_eq!(frames, 2);
        Ok(())
    }

    fn sse_body(frames: &[&str]) -> String {
        frames.iter().map(|frame| format!("{frame}\n\n")).collect()
    }

    #[tokio::test]
    async fn relays_deltas_then_done() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;
        let body = sse_body(&[
            "event: response.created\ndata: {\"type\":\"response.created\"}",
            "data: {\"type\":\"response.output_text.delta\",\"delta\":\"Hel\"}",
            "data: {\"type\":\"response.output_text.delta\",\"delta\":\"lo\"}",
            "data: {\"type\":\"response.completed\"}",
            "data: {\"type\":\"response.output_text.delta\",\"delta\":\"late\"}",
        ]);

        Mock::given(method("POST"))
            .and(path("/responses"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4.1-mini",
                "stream": true,
                "input": [{
                    "role": "system",
                    "content": "You are a friendly support agent. \
                        Resolve the issue without escalation unless absolutely necessary."
                }]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(body, "text/event-stream"),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/support/chat")
            .add_header("X-OPENAI-KEY", KEY)
            .json(&json!({ "messages": [{ "role": "user", "content": "Where is my order?" }] }))
            .await;

        response.assert_status_ok();
        assert!(
            response
                .header("content-type")
                .to_str()?
                .starts_with("text/event-stream")
        );
        assert_eq!(response.header("cache-control"), "no-cache");

        assert_eq!(
            sse_payloads(&response.text()),
            vec![
                json!({ "delta": "Hel" }),
                json!({ "delta": "lo" }),
                json!({ "done": true }),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn malformed_frames_do_not_abort_the_stream() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;
        let body = sse_body(&[
            "data: {\"type\":\"response.output_text.delta\",\"delta\":\"a\"}",
            "data: {not json",
            "data: [DONE]",
            "data: {\"type\":\"response.output_text.delta\",\"delta\":\"b\"}",
        ]);

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_raw(body, "text/event-stream"),
            )
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/support/chat")
            .add_header("X-OPENAI-KEY", KEY)
            .json(&json!({
                "messages": [{ "role": "user", "content": "hi" }],
                "escalate": true
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            sse_payloads(&response.text()),
            vec![
                json!({ "delta": "a" }),
                json!({ "error": "stream_parse_error", "detail": "{not json" }),
                json!({ "delta": "b" }),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn upstream_errors_pass_through() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;
        let error_body = json!({ "error": { "message": "Incorrect API key provided" } });

        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(401).set_body_json(&error_body))
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/support/chat")
            .add_header("X-OPENAI-KEY", KEY)
            .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.header("content-type"), "application/json");
        assert_eq!(response.json::<serde_json::Value>(), error_body);
        Ok(())
    }

    #[tokio::test]
    async fn missing_key_is_rejected_before_upstream() -> anyhow::Result<()> {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let server = create_test_server_with_upstream(&upstream).await?;
        let response = server
            .post("/api/support/chat")
            .json(&json!({ "messages": [{ "role": "user", "content": "hi" }] }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "missing_api_key");
        Ok(())
    }
}
