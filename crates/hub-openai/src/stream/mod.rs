//! Server-sent event relay for streaming responses.
//!
//! [`FrameReader`] splits the upstream body into frames, [`parse_frame`]
//! maps each frame to at most one [`RelayEvent`], and [`relay_events`] ties
//! both together over a byte stream.

mod event;
mod frame;
mod relay;

pub use event::{
    OUTPUT_TEXT_DELTA, RESPONSE_COMPLETED, RelayEvent, STREAM_PARSE_ERROR, frame_data, parse_frame,
};
pub use frame::FrameReader;
pub use relay::relay_events;
