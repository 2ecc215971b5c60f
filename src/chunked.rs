//! Chunked transfer-coding sub-state machine.
//!
//! Walks chunk-size lines via `httparse::parse_chunk_size`, the trailing
//! CRLF after each chunk's data, and an optional (ignored) trailer block
//! before the terminating blank line.

use httparse::{self, Status};

/// Where we are within one chunk's framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sub {
    /// Waiting for a `<hex-size>\r\n` line.
    NeedSize,
    /// Streaming the body of the current chunk; `remaining` bytes left.
    Draining(u64),
    /// A chunk's body just finished; waiting for its trailing CRLF.
    ChunkCrlf,
    /// The `0\r\n` terminator chunk was seen; waiting for the (ignored)
    /// trailer block to end with a blank line.
    Trailer,
    /// The terminating blank line after a zero-size chunk has been seen.
    Done,
}

/// Tracks progress through a chunked body across any number of `feed` calls.
#[derive(Debug, Clone)]
pub struct ChunkedState {
    sub: Sub,
}

/// What `feed` found at the front of the buffer.
#[derive(Debug, PartialEq, Eq)]
pub enum ChunkedStep {
    /// `n` bytes of chunk body are available at the front of the buffer
    /// (after the bytes `feed` already reported consumed); stream them out
    /// and call `consume_body(n)`.
    BodyAvailable(u64),
    /// A trailer header line was seen and ignored; log a warning.
    TrailerIgnored,
    /// Not enough bytes buffered to make further progress; wait for more
    /// data before calling `feed` again.
    NeedMoreData,
    /// The terminating blank line was seen; the body is complete.
    MessageComplete,
    /// A chunk-size line, or the chunk-data CRLF, was not well-formed.
    ParseFailed,
}

impl ChunkedState {
    pub fn new() -> ChunkedState {
        ChunkedState { sub: Sub::NeedSize }
    }

    /// Looks at the front of `input` and reports progress as a
    /// `(consumed, step)` pair: `consumed` leading bytes were pure framing
    /// (a size line, the inter-chunk CRLF, a trailer line, or the final
    /// blank line) and should be dropped from the real input buffer
    /// regardless of `step`. Call `feed` again immediately after consuming
    /// those bytes unless `step` is `NeedMoreData` with `consumed == 0`.
    pub fn feed(&mut self, input: &[u8]) -> (usize, ChunkedStep) {
        match self.sub {
            Sub::NeedSize => self.feed_size_line(input),
            Sub::Draining(remaining) => {
                (0, ChunkedStep::BodyAvailable(remaining.min(input.len() as u64)))
            }
            Sub::ChunkCrlf => self.feed_chunk_crlf(input),
            Sub::Trailer => self.feed_trailer_line(input),
            Sub::Done => (0, ChunkedStep::MessageComplete),
        }
    }

    fn feed_size_line(&mut self, input: &[u8]) -> (usize, ChunkedStep) {
        match httparse::parse_chunk_size(input) {
            Ok(Status::Complete((n, 0))) => {
                self.sub = Sub::Trailer;
                (n, ChunkedStep::NeedMoreData)
            }
            Ok(Status::Complete((n, size))) => {
                self.sub = Sub::Draining(size);
                (n, ChunkedStep::NeedMoreData)
            }
            Ok(Status::Partial) => (0, ChunkedStep::NeedMoreData),
            Err(_) => (0, ChunkedStep::ParseFailed),
        }
    }

    fn feed_chunk_crlf(&mut self, input: &[u8]) -> (usize, ChunkedStep) {
        if input.len() < 2 {
            return (0, ChunkedStep::NeedMoreData);
        }
        if &input[..2] != b"\r\n" {
            return (0, ChunkedStep::ParseFailed);
        }
        self.sub = Sub::NeedSize;
        (2, ChunkedStep::NeedMoreData)
    }

    fn feed_trailer_line(&mut self, input: &[u8]) -> (usize, ChunkedStep) {
        match find_crlf(input) {
            Some(0) => {
                self.sub = Sub::Done;
                (2, ChunkedStep::MessageComplete)
            }
            Some(i) => (i + 2, ChunkedStep::TrailerIgnored),
            None => (0, ChunkedStep::NeedMoreData),
        }
    }

    /// Records that `n` bytes of the current chunk's body were streamed
    /// out and dropped from the real input buffer.
    pub fn consume_body(&mut self, n: u64) {
        if let Sub::Draining(remaining) = self.sub {
            let left = remaining - n;
            self.sub = if left == 0 { Sub::ChunkCrlf } else { Sub::Draining(left) };
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.sub, Sub::Done)
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod test {
    use super::{ChunkedState, ChunkedStep};

    /// Drives `st` over `input` until it stops making progress, mimicking
    /// how `connection.rs` drains a real transport buffer, and returns the
    /// body bytes it collected along the way.
    fn drain(st: &mut ChunkedState, input: &[u8]) -> Vec<u8> {
        let mut pos = 0;
        let mut body = Vec::new();
        loop {
            let (consumed, step) = st.feed(&input[pos..]);
            pos += consumed;
            match step {
                ChunkedStep::NeedMoreData => {
                    if consumed == 0 { break; }
                }
                ChunkedStep::TrailerIgnored => {}
                ChunkedStep::BodyAvailable(0) => break,
                ChunkedStep::BodyAvailable(n) => {
                    let n = n as usize;
                    body.extend_from_slice(&input[pos..pos + n]);
                    pos += n;
                    st.consume_body(n as u64);
                }
                ChunkedStep::MessageComplete => break,
                ChunkedStep::ParseFailed => panic!("chunk parse failed"),
            }
        }
        body
    }

    #[test]
    fn streams_two_chunks_then_completes() {
        let input = b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let mut st = ChunkedState::new();
        let body = drain(&mut st, input);
        assert_eq!(body, b"Wikipedia");
        assert!(st.is_done());
    }

    #[test]
    fn rejects_bad_hex() {
        let mut st = ChunkedState::new();
        let (_, step) = st.feed(b"not-hex\r\n");
        assert!(matches!(step, ChunkedStep::ParseFailed));
    }

    #[test]
    fn tolerates_a_trailer_header_before_the_blank_line() {
        let input = b"0\r\nX-Trailer: value\r\n\r\n";
        let mut st = ChunkedState::new();
        let body = drain(&mut st, input);
        assert!(body.is_empty());
        assert!(st.is_done());
    }

    #[test]
    fn stops_cleanly_on_a_chunk_boundary_split_across_reads() {
        let mut st = ChunkedState::new();
        let (consumed, step) = st.feed(b"4\r\nWi");
        assert_eq!(consumed, 3);
        assert!(matches!(step, ChunkedStep::NeedMoreData));
        match st.feed(b"Wi") {
            (0, ChunkedStep::BodyAvailable(2)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
