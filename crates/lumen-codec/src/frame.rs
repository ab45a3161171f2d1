//! SLIP-style byte-stuffed framing.
//!
//! Delimiter `0xC0` opens and closes a frame; escape `0xDB` begins a two-byte
//! escape sequence (`0xDB 0xDC` for a literal `0xC0`, `0xDB 0xDD` for a
//! literal `0xDB`). Implemented as an explicit state machine rather than a
//! one-shot transform so the escape rule, lenient recovery, and empty-frame
//! handling stay localized and independently testable.

pub const DELIMITER: u8 = 0xC0;
pub const ESCAPE: u8 = 0xDB;
const ESCAPED_DELIMITER: u8 = 0xDC;
const ESCAPED_ESCAPE: u8 = 0xDD;

/// Byte-stuff `payload` and wrap it with leading/trailing delimiters.
///
/// Always emits a leading `0xC0`, the (possibly stuffed) payload, and a
/// trailing `0xC0`, regardless of the payload's contents.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 2);
    out.push(DELIMITER);
    for &byte in payload {
        match byte {
            DELIMITER => {
                out.push(ESCAPE);
                out.push(ESCAPED_DELIMITER);
            }
            ESCAPE => {
                out.push(ESCAPE);
                out.push(ESCAPED_ESCAPE);
            }
            other => out.push(other),
        }
    }
    out.push(DELIMITER);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Waiting for the opening delimiter of the next frame.
    BetweenFrames,
    /// Inside a frame, accumulating unstuffed bytes.
    InFrame,
    /// Just consumed an escape byte inside a frame.
    Escaped,
}

/// Incremental SLIP decoder. Feed it raw bytes as they arrive off the wire;
/// it yields complete, unstuffed frame payloads (still including their
/// trailing checksum byte — checksum validation is a separate step).
///
/// Decoding is lenient: any byte following an escape that is not one of the
/// two recognized escape codes is passed through literally rather than
/// rejected, and consecutive delimiters (an empty frame) are discarded
/// without producing an output.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: DecodeStateHolder,
}

#[derive(Debug)]
struct DecodeStateHolder {
    state: DecodeState,
    current: Vec<u8>,
}

impl Default for DecodeStateHolder {
    fn default() -> Self {
        Self {
            state: DecodeState::BetweenFrames,
            current: Vec::new(),
        }
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `bytes` into the decoder, returning every frame completed by
    /// this call (in order). Partial frames are retained internally for the
    /// next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        for &byte in bytes {
            match self.state.state {
                DecodeState::BetweenFrames => {
                    if byte == DELIMITER {
                        self.state.state = DecodeState::InFrame;
                        self.state.current.clear();
                    }
                    // Any other byte seen between frames is noise and is dropped.
                }
                DecodeState::InFrame => {
                    if byte == DELIMITER {
                        if !self.state.current.is_empty() {
                            frames.push(std::mem::take(&mut self.state.current));
                        }
                        // Consecutive delimiters (empty frame) are discarded;
                        // either way we stay ready for the next frame.
                        self.state.state = DecodeState::InFrame;
                        self.state.current.clear();
                    } else if byte == ESCAPE {
                        self.state.state = DecodeState::Escaped;
                    } else {
                        self.state.current.push(byte);
                    }
                }
                DecodeState::Escaped => {
                    let literal = match byte {
                        ESCAPED_DELIMITER => DELIMITER,
                        ESCAPED_ESCAPE => ESCAPE,
                        // Lenient: unrecognized byte after an escape is passed through as-is.
                        other => other,
                    };
                    self.state.current.push(literal);
                    self.state.state = DecodeState::InFrame;
                }
            }
        }
        frames
    }
}

/// Decode a single, already-complete wire buffer in one shot. Returns every
/// non-empty frame found in `bytes`. Convenience wrapper over
/// [`FrameDecoder`] for callers (e.g. the simulator) that always hand over
/// whole packets rather than a streaming byte source.
pub fn decode_all(bytes: &[u8]) -> Vec<Vec<u8>> {
    FrameDecoder::new().feed(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_always_brackets_with_delimiters() {
        let framed = encode(&[1, 2, 3]);
        assert_eq!(framed.first(), Some(&DELIMITER));
        assert_eq!(framed.last(), Some(&DELIMITER));
    }

    #[test]
    fn round_trip_arbitrary_payload() {
        let payload = vec![0x00, 0x05, 0x20, 0x25];
        let framed = encode(&payload);
        let decoded = decode_all(&framed);
        assert_eq!(decoded, vec![payload]);
    }

    #[test]
    fn delimiter_byte_is_escaped_and_recovered() {
        let payload = vec![0xC0, 0x01];
        let framed = encode(&payload);
        assert_eq!(framed, vec![0xC0, 0xDB, 0xDC, 0x01, 0xC0]);
        assert_eq!(decode_all(&framed), vec![payload]);
    }

    #[test]
    fn escape_byte_is_escaped_and_recovered() {
        let payload = vec![0xDB, 0x02];
        let framed = encode(&payload);
        assert_eq!(framed, vec![0xC0, 0xDB, 0xDD, 0x02, 0xC0]);
        assert_eq!(decode_all(&framed), vec![payload]);
    }

    #[test]
    fn consecutive_delimiters_denote_empty_frame_and_are_discarded() {
        let bytes = vec![DELIMITER, DELIMITER, DELIMITER];
        assert!(decode_all(&bytes).is_empty());
    }

    #[test]
    fn lenient_decode_passes_through_unrecognized_escape_continuation() {
        let bytes = vec![DELIMITER, ESCAPE, 0x42, DELIMITER];
        assert_eq!(decode_all(&bytes), vec![vec![0x42]]);
    }

    #[test]
    fn incremental_feed_across_multiple_calls() {
        let mut decoder = FrameDecoder::new();
        let full = encode(&[1, 2, 3]);
        let (first, second) = full.split_at(2);
        assert!(decoder.feed(first).is_empty());
        let frames = decoder.feed(second);
        assert_eq!(frames, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn multiple_frames_in_one_buffer() {
        let mut bytes = encode(&[1]);
        bytes.extend(encode(&[2, 3]));
        assert_eq!(decode_all(&bytes), vec![vec![1], vec![2, 3]]);
    }
}
