//! Line framing for the chat wire protocol.
//!
//! Lines are split on raw bytes and decoded lossily, so a stray non-UTF-8
//! byte shows up as U+FFFD instead of ending the connection. Inbound lines
//! longer than the configured limit are discarded up to the next newline
//! and surface as [`Inbound::Overlong`], so the dispatcher never sees a
//! fragment of a line. The limit excludes the `\n` or `\r\n` terminator.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, Encoder};

/// One decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete line, without its line terminator
    Line(String),
    /// A line that exceeded the length limit and was dropped
    Overlong,
}

/// Newline-delimited codec with a maximum line length.
#[derive(Debug, Clone)]
pub struct ChatLineCodec {
    inner: AnyDelimiterCodec,
    max_length: usize,
}

impl ChatLineCodec {
    /// Create a codec accepting lines of at most `max_length` bytes.
    pub fn new(max_length: usize) -> Self {
        // One extra byte leaves room for the `\r` of a CRLF terminator.
        let inner = AnyDelimiterCodec::new_with_max_length(
            b"\n".to_vec(),
            b"\n".to_vec(),
            max_length.saturating_add(1),
        );
        Self { inner, max_length }
    }

    /// Get the maximum accepted line length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn frame(&self, chunk: Bytes) -> Inbound {
        let line = chunk.strip_suffix(b"\r").unwrap_or(&chunk[..]);
        if line.len() > self.max_length {
            return Inbound::Overlong;
        }
        Inbound::Line(String::from_utf8_lossy(line).into_owned())
    }

    fn map_frame(
        &self,
        result: Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<Inbound>, std::io::Error> {
        match result {
            Ok(chunk) => Ok(chunk.map(|chunk| self.frame(chunk))),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Inbound::Overlong)),
            Err(AnyDelimiterCodecError::Io(e)) => Err(e),
        }
    }
}

impl Decoder for ChatLineCodec {
    type Item = Inbound;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, std::io::Error> {
        let result = self.inner.decode(buf);
        self.map_frame(result)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, std::io::Error> {
        let result = self.inner.decode_eof(buf);
        self.map_frame(result)
    }
}

impl Encoder<String> for ChatLineCodec {
    type Error = std::io::Error;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), std::io::Error> {
        self.inner.encode(line, dst).map_err(|e| match e {
            AnyDelimiterCodecError::Io(e) => e,
            AnyDelimiterCodecError::MaxChunkLengthExceeded => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
            }
        })
    }
}
