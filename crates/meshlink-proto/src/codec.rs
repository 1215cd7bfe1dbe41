//! Tokio codec for component A: accepts CR, LF, or CRLF as a line
//! delimiter, silently drops empty lines, and always writes `<line>CRLF`
//! (spec §4.A).

#![cfg(feature = "tokio")]

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::message::Message;
use crate::parse::parse_line;

/// Default IRC line length limit (RFC 1459/2812 §2.3).
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

pub struct MeshlinkCodec {
    max_len: usize,
}

impl MeshlinkCodec {
    pub fn new() -> Self {
        Self { max_len: DEFAULT_MAX_LINE_LEN }
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Find the next line terminator (`\r`, `\n`, or `\r\n`) in `src`,
    /// returning (line_end_exclusive, bytes_to_consume).
    fn find_terminator(src: &[u8]) -> Option<(usize, usize)> {
        for (i, &b) in src.iter().enumerate() {
            if b == b'\n' {
                return Some((i, i + 1));
            }
            if b == b'\r' {
                if src.get(i + 1) == Some(&b'\n') {
                    return Some((i, i + 2));
                }
                return Some((i, i + 1));
            }
        }
        None
    }
}

impl Default for MeshlinkCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MeshlinkCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, ProtocolError> {
        loop {
            let Some((line_end, consume)) = Self::find_terminator(&src[..]) else {
                if src.len() > self.max_len {
                    return Err(ProtocolError::LineTooLong {
                        actual: src.len(),
                        limit: self.max_len,
                    });
                }
                return Ok(None);
            };

            if line_end > self.max_len {
                src.advance(consume);
                return Err(ProtocolError::LineTooLong {
                    actual: line_end,
                    limit: self.max_len,
                });
            }

            let line_bytes = src[..line_end].to_vec();
            src.advance(consume);

            let line = String::from_utf8(line_bytes).map_err(|_| ProtocolError::InvalidUtf8)?;
            match parse_line(&line)? {
                Some(msg) => return Ok(Some(msg)),
                None => continue, // empty line: keep scanning the buffer
            }
        }
    }
}

impl Encoder<Message> for MeshlinkCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = msg.to_string();
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
