use std::fmt::Display;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::{FrameReader, RelayEvent, parse_frame};
use crate::TRACING_TARGET_STREAM;

/// Turns an upstream byte stream into relay events.
///
/// Events are yielded in upstream order. The stream ends right after the
/// first [`RelayEvent::Done`], when the body ends, or on the first transport
/// error. A transport error is logged and ends the stream without a terminal
/// event.
pub fn relay_events<S, E>(chunks: S) -> impl Stream<Item = RelayEvent> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut reader = FrameReader::new();
        let mut relayed = 0usize;

        while let Some(chunk) = chunks.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_STREAM,
                        error = %error,
                        relayed,
                        "Upstream stream failed"
                    );
                    return;
                }
            };

            reader.push(&chunk);
            while let Some(frame) = reader.next_frame() {
                let Some(event) = parse_frame(&frame) else {
                    continue;
                };

                if let RelayEvent::Error { detail, .. } = &event {
                    tracing::warn!(
                        target: TRACING_TARGET_STREAM,
                        payload_len = detail.len(),
                        "Skipping malformed upstream frame"
                    );
                }

                relayed += 1;
                let done = event.is_done();
                yield event;
                if done {
                    tracing::debug!(target: TRACING_TARGET_STREAM, relayed, "Upstream completed");
                    return;
                }
            }
        }

        if let Some(event) = reader.finish().as_deref().and_then(parse_frame) {
            relayed += 1;
            yield event;
        }

        tracing::debug!(target: TRACING_TARGET_STREAM, relayed, "Upstream body ended");
    }
}
