//! Decoder for Nomad's streamed log frames.
//!
//! `GET /v1/client/fs/logs/:alloc` answers with a never-ending sequence of
//! concatenated JSON objects, split arbitrarily across HTTP chunks:
//!
//! ```json
//! {"Offset":1024,"Data":"aGVsbG8K","File":"alloc/logs/app.stdout.0"}{}{"FileEvent":"file truncated"}
//! ```
//!
//! `{}` is a heartbeat. `Data` is base64 of the raw file bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::StreamError;

/// Upper bound for bytes buffered while waiting for a frame to complete.
const MAX_PENDING_BYTES: usize = 4 * 1024 * 1024;

/// One decoded frame.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct StreamFrame {
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_event: Option<String>,
}

impl StreamFrame {
    /// Heartbeat frames carry neither data nor a file event.
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        self.data.as_deref().map_or(true, str::is_empty) && self.file_event.is_none()
    }

    /// Decoded payload bytes; empty for heartbeats and file events.
    pub fn payload(&self) -> Result<Vec<u8>, StreamError> {
        match self.data.as_deref() {
            None | Some("") => Ok(Vec::new()),
            Some(data) => STANDARD
                .decode(data)
                .map_err(|e| StreamError::Decode(format!("invalid base64 payload: {e}"))),
        }
    }
}

/// Incremental decoder: push raw body bytes, pull complete frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes read from the response body.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        if self.buf.len() + bytes.len() > MAX_PENDING_BYTES {
            return Err(StreamError::Decode(format!(
                "incomplete frame exceeds {MAX_PENDING_BYTES} bytes"
            )));
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Next complete frame, or `None` until more bytes arrive.
    pub fn next_frame(&mut self) -> Result<Option<StreamFrame>, StreamError> {
        let mut frames = serde_json::Deserializer::from_slice(&self.buf).into_iter::<StreamFrame>();
        match frames.next() {
            Some(Ok(frame)) => {
                let consumed = frames.byte_offset();
                self.buf.drain(..consumed);
                Ok(Some(frame))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(StreamError::Decode(e.to_string())),
            None => {
                // Only whitespace left.
                self.buf.clear();
                Ok(None)
            }
        }
    }

    /// Bytes held back waiting for the rest of a frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_json(text: &str) -> String {
        format!(
            r#"{{"Offset":10,"Data":"{}","File":"alloc/logs/app.stdout.0"}}"#,
            STANDARD.encode(text)
        )
    }

    #[test]
    fn decodes_consecutive_frames() {
        let mut decoder = FrameDecoder::new();
        let body = format!("{}{}", frame_json("one\n"), frame_json("two\n"));
        decoder.push(body.as_bytes()).unwrap();

        let first = decoder.next_frame().unwrap().unwrap();
        assert_eq!(first.payload().unwrap(), b"one\n");
        let second = decoder.next_frame().unwrap().unwrap();
        assert_eq!(second.payload().unwrap(), b"two\n");
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn waits_for_frames_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        let body = frame_json("hello\n");
        let (head, tail) = body.split_at(body.len() / 2);

        decoder.push(head.as_bytes()).unwrap();
        assert!(decoder.next_frame().unwrap().is_none());
        assert!(decoder.pending() > 0);

        decoder.push(tail.as_bytes()).unwrap();
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.payload().unwrap(), b"hello\n");
    }

    #[test]
    fn heartbeats_and_file_events() {
        let mut decoder = FrameDecoder::new();
        decoder
            .push(br#"{} {"FileEvent":"file truncated","File":"x"}"#)
            .unwrap();

        let heartbeat = decoder.next_frame().unwrap().unwrap();
        assert!(heartbeat.is_heartbeat());
        assert!(heartbeat.payload().unwrap().is_empty());

        let event = decoder.next_frame().unwrap().unwrap();
        assert!(!event.is_heartbeat());
        assert_eq!(event.file_event.as_deref(), Some("file truncated"));
    }

    #[test]
    fn trailing_whitespace_is_discarded() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"{}\n  \n").unwrap();
        assert!(decoder.next_frame().unwrap().is_some());
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"<html>bad gateway</html>").unwrap();
        assert!(matches!(decoder.next_frame(), Err(StreamError::Decode(_))));
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let frame = StreamFrame {
            data: Some("!!!".into()),
            ..Default::default()
        };
        assert!(matches!(frame.payload(), Err(StreamError::Decode(_))));
    }
}
