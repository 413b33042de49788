/// Frame delimiter of the server-sent events wire format.
const DELIMITER: &[u8] = b"\n\n";

/// Incremental splitter for blank-line delimited server-sent event frames.
///
/// Bytes are buffered raw and only decoded once a whole frame is available,
/// so a multibyte character split across two reads is reassembled intact.
#[derive(Debug, Default)]
pub struct FrameReader {
    buffer: Vec<u8>,
    // Bytes before this offset are known not to start a delimiter.
    scanned: usize,
}

impl FrameReader {
    /// Creates an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk read from the upstream body.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Pops the next complete frame, without its delimiter.
    pub fn next_frame(&mut self) -> Option<String> {
        let start = self.scanned.min(self.buffer.len());
        let position = self.buffer[start..]
            .windows(DELIMITER.len())
            .position(|window| window == DELIMITER)
            .map(|offset| start + offset);

        let Some(position) = position else {
            self.scanned = self.buffer.len().saturating_sub(DELIMITER.len() - 1);
            return None;
        };

        let frame: Vec<u8> = self.buffer.drain(..position + DELIMITER.len()).collect();
        self.scanned = 0;
        Some(String::from_utf8_lossy(&frame[..position]).into_owned())
    }

    /// Returns the buffered remainder once the body has ended.
    ///
    /// Whitespace-only remainders are discarded.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;

        let rest = String::from_utf8_lossy(&rest).into_owned();
        (!rest.trim().is_empty()).then_some(rest)
    }

    /// Returns the number of buffered bytes not yet emitted as a frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
