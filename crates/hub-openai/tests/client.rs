use std::time::Duration;

use futures::StreamExt;
use hub_openai::stream::RelayEvent;
use hub_openai::{
    ASSISTANTS_PURPOSE, ApiKey, Error, FilePart, ImageRequest, InputMessage, OpenAiClient,
    OpenAiConfig, RealtimeSessionRequest, ResponseRequest, SpeechRequest, VideoRequest,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = OpenAiConfig::builder()
        .with_base_url(format!("{}/v1", server.uri()))
        .build()
        .unwrap();
    OpenAiClient::new(config).unwrap()
}

fn key() -> ApiKey {
    ApiKey::new("sk-test").unwrap()
}

fn sse_body(frames: &[serde_json::Value]) -> String {
    frames
        .iter()
        .map(|frame| format!("event: {}\ndata: {frame}\n\n", frame["type"].as_str().unwrap()))
        .collect()
}

#[tokio::test]
async fn stream_response_relays_upstream_events() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        json!({ "type": "response.created", "response": {} }),
        json!({ "type": "response.output_text.delta", "delta": "Hel" }),
        json!({ "type": "response.output_text.delta", "delta": "lo" }),
        json!({ "type": "response.completed", "response": {} }),
    ]);

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "stream": true, "model": "gpt-4.1-mini" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_raw(body, "text/event-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = ResponseRequest::new("gpt-4.1-mini", vec![InputMessage::user("hi")]);
    let stream = client_for(&server)
        .stream_response(&key(), &request)
        .await
        .unwrap();

    let events: Vec<_> = stream.into_events().collect().await;
    assert_eq!(
        events,
        vec![
            RelayEvent::delta("Hel"),
            RelayEvent::delta("lo"),
            RelayEvent::done()
        ]
    );
}

#[tokio::test]
async fn stream_response_surfaces_upstream_errors_before_streaming() {
    let server = MockServer::start().await;
    let upstream = json!({ "error": { "message": "Incorrect API key provided" } });

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_json(&upstream))
        .mount(&server)
        .await;

    let request = ResponseRequest::new("gpt-4.1-mini", vec![InputMessage::user("hi")]);
    let error = client_for(&server)
        .stream_response(&key(), &request)
        .await
        .unwrap_err();

    match error {
        Error::Upstream { status, body } => {
            assert_eq!(status.as_u16(), 401);
            let body: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body, upstream);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn create_response_extracts_output_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({
            "input": [
                { "role": "system", "content": "You are terse." },
                { "role": "user", "content": "Ping?" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": "Pong." }]
            }]
        })))
        .mount(&server)
        .await;

    let request = ResponseRequest::new("gpt-4.1-mini", vec![InputMessage::user("Ping?")])
        .with_instructions("You are terse.");
    let response = client_for(&server)
        .create_response(&key(), &request)
        .await
        .unwrap();

    assert_eq!(response.output_text(), Some("Pong."));
}

#[tokio::test]
async fn create_embeddings_returns_vectors_in_input_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": ["a", "b"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        })))
        .mount(&server)
        .await;

    let vectors = client_for(&server)
        .create_embeddings(
            &key(),
            "text-embedding-3-small",
            vec!["a".to_owned(), "b".to_owned()],
        )
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn create_embeddings_rejects_short_payloads() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_embeddings(&key(), "text-embedding-3-small", "query".to_owned())
        .await
        .unwrap_err();

    assert!(matches!(error, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn realtime_session_passes_any_status_through() {
    let server = MockServer::start().await;
    let upstream = json!({ "error": { "message": "model not found" } });

    Mock::given(method("POST"))
        .and(path("/v1/realtime/sessions"))
        .and(body_partial_json(json!({ "voice": "verse" })))
        .respond_with(ResponseTemplate::new(404).set_body_json(&upstream))
        .mount(&server)
        .await;

    let request = RealtimeSessionRequest::new("gpt-4o-realtime-preview", "Say hi.");
    let response = client_for(&server)
        .create_realtime_session(&key(), &request)
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 404);
    assert!(!response.is_success());
    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn file_content_is_returned_as_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/files/file-1/content"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Refunds take 5 days."))
        .mount(&server)
        .await;

    let content = client_for(&server)
        .file_content(&key(), "file-1")
        .await
        .unwrap();

    assert_eq!(content, "Refunds take 5 days.");
}

#[tokio::test]
async fn unreachable_upstream_is_a_connect_error() {
    let config = OpenAiConfig::builder()
        .with_base_url("http://127.0.0.1:9/v1")
        .build()
        .unwrap();
    let client = OpenAiClient::new(config).unwrap();

    let error = client.file_content(&key(), "file-1").await.unwrap_err();
    assert!(matches!(error, Error::Http(_)));
}

/// Reads one HTTP/1.1 request with a `content-length` body.
async fn read_request(socket: &mut TcpStream) {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];

    let header_end = loop {
        let read = socket.read(&mut buffer).await.unwrap();
        assert!(read > 0, "client closed before sending a request");
        request.extend_from_slice(&buffer[..read]);
        if let Some(position) = request.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&request[..header_end]).to_ascii_lowercase();
    let content_length: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|value| value.trim().parse().unwrap())
        .unwrap_or_default();

    while request.len() < header_end + content_length {
        let read = socket.read(&mut buffer).await.unwrap();
        assert!(read > 0, "client closed mid-request");
        request.extend_from_slice(&buffer[..read]);
    }
}

#[tokio::test]
async fn dropping_the_event_stream_closes_the_upstream_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;

        let frame = "data: {\"type\":\"response.output_text.delta\",\"delta\":\"a\"}\n\n";
        let head = "HTTP/1.1 200 OK\r\n\
                    content-type: text/event-stream\r\n\
                    transfer-encoding: chunked\r\n\r\n";
        socket.write_all(head.as_bytes()).await.unwrap();
        socket
            .write_all(format!("{:x}\r\n{frame}\r\n", frame.len()).as_bytes())
            .await
            .unwrap();
        socket.flush().await.unwrap();

        // The body never finishes; the next read only returns once the client is gone.
        let mut buffer = [0u8; 64];
        let closed = matches!(socket.read(&mut buffer).await, Ok(0) | Err(_));
        let _ = closed_tx.send(closed);
    });

    let config = OpenAiConfig::builder()
        .with_base_url(format!("http://{address}/v1"))
        .build()
        .unwrap();
    let client = OpenAiClient::new(config).unwrap();

    let request = ResponseRequest::new("gpt-4.1-mini", vec![InputMessage::user("hi")]);
    let stream = client.stream_response(&key(), &request).await.unwrap();

    let mut events = Box::pin(stream.into_events());
    assert_eq!(events.next().await, Some(RelayEvent::delta("a")));
    drop(events);

    let closed = tokio::time::timeout(Duration::from_secs(5), closed_rx)
        .await
        .expect("upstream connection was not released")
        .unwrap();
    assert!(closed);
}

#[tokio::test]
async fn upload_file_sends_multipart_with_purpose() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("name=\"purpose\""))
        .and(body_string_contains("assistants"))
        .and(body_string_contains("filename=\"policy.txt\""))
        .and(body_string_contains("Refunds take 5 days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-1",
            "object": "file",
            "filename": "policy.txt",
            "bytes": 19,
            "created_at": 1_700_000_000,
            "purpose": "assistants"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = FilePart::new("policy.txt", "Refunds take 5 days").with_content_type("text/plain");
    let uploaded = client_for(&server)
        .upload_file(&key(), file, ASSISTANTS_PURPOSE)
        .await
        .unwrap();

    assert_eq!(uploaded.id, "file-1");
    assert_eq!(uploaded.bytes, 19);
    assert_eq!(uploaded.created_at, Some(1_700_000_000));
}

#[tokio::test]
async fn list_files_filters_by_purpose() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/files"))
        .and(query_param("purpose", "assistants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                { "id": "file-1", "filename": "a.txt", "bytes": 3, "created_at": 1 },
                { "id": "file-2", "filename": "b.txt", "bytes": 4, "created_at": 2 }
            ]
        })))
        .mount(&server)
        .await;

    let files = client_for(&server)
        .list_files(&key(), ASSISTANTS_PURPOSE)
        .await
        .unwrap();

    let ids: Vec<_> = files.iter().map(|file| file.id.as_str()).collect();
    assert_eq!(ids, ["file-1", "file-2"]);
}

fn image_request() -> ImageRequest {
    ImageRequest {
        model: "gpt-image-1".to_owned(),
        prompt: "a red kite".to_owned(),
        n: 1,
        size: "1024x1024".to_owned(),
        quality: "auto".to_owned(),
        background: None,
        output_format: None,
    }
}

#[tokio::test]
async fn generate_images_posts_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(body_partial_json(json!({ "model": "gpt-image-1", "prompt": "a red kite", "n": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{ "b64_json": "aGVsbG8=" }]
        })))
        .mount(&server)
        .await;

    let images = client_for(&server)
        .generate_images(&key(), &image_request())
        .await
        .unwrap();

    assert_eq!(images.data.len(), 1);
    assert_eq!(images.data[0].b64_json.as_deref(), Some("aGVsbG8="));
}

#[tokio::test]
async fn edit_images_attaches_every_reference() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/edits"))
        .and(body_string_contains("name=\"image[]\"; filename=\"model.png\""))
        .and(body_string_contains("name=\"image[]\"; filename=\"shirt.png\""))
        .and(body_string_contains("name=\"input_fidelity\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://images.example/1.png" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let references = vec![
        FilePart::new("model.png", &b"model-bytes"[..]).with_content_type("image/png"),
        FilePart::new("shirt.png", &b"shirt-bytes"[..]).with_content_type("image/png"),
    ];
    let images = client_for(&server)
        .edit_images(&key(), image_request(), references)
        .await
        .unwrap();

    assert_eq!(images.data[0].url.as_deref(), Some("https://images.example/1.png"));
}

#[tokio::test]
async fn video_jobs_are_created_and_retrieved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/videos"))
        .and(body_string_contains("sora-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "video_1", "object": "video", "status": "queued", "model": "sora-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/videos/video_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "video_1", "status": "completed", "progress": 100, "seconds": "8"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = VideoRequest {
        prompt: "waves at dusk".to_owned(),
        model: "sora-2".to_owned(),
        seconds: "8".to_owned(),
        size: "1280x720".to_owned(),
    };

    let job = client.create_video(&key(), &request).await.unwrap();
    assert_eq!(job.status, "queued");
    assert_eq!(job.extra["object"], "video");

    let job = client.retrieve_video(&key(), "video_1").await.unwrap();
    assert!(job.is_completed());
    assert_eq!(job.progress, Some(100.0));
}

#[tokio::test]
async fn video_content_passes_any_status_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/videos/video_1/content"))
        .and(query_param("variant", "thumbnail"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(&b"\x89PNG"[..], "image/png"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/videos/video_2/content"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": { "message": "not ready" } })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);

    let content = client
        .download_video_content(&key(), "video_1", "thumbnail")
        .await
        .unwrap();
    assert!(content.is_success());
    assert_eq!(content.content_type.as_deref(), Some("image/png"));
    assert_eq!(&content.body[..], b"\x89PNG");

    let content = client
        .download_video_content(&key(), "video_2", "video")
        .await
        .unwrap();
    assert_eq!(content.status.as_u16(), 404);
}

#[tokio::test]
async fn audio_round_trip_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(body_string_contains("whisper-1"))
        .and(body_string_contains("filename=\"recording.webm\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": " hello " })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_partial_json(json!({ "voice": "verse", "response_format": "mp3" })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(&b"ID3"[..], "audio/mpeg"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let transcription = client
        .transcribe(&key(), "whisper-1", FilePart::new("recording.webm", &b"webm"[..]))
        .await
        .unwrap();
    assert_eq!(transcription.text, " hello ");

    let speech = SpeechRequest::mp3("gpt-4o-mini-tts", "verse", "hello");
    let audio = client.create_speech(&key(), &speech).await.unwrap();
    assert_eq!(&audio[..], b"ID3");
}
