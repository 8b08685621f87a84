use bytes::{Bytes, BytesMut};

use crate::codec::{EncodeError, HeaderEncoder, ParseStatus};
use crate::protocol::error::MessageError;
use crate::protocol::headers::Headers;

/// Hard bound on a physical header line per RFC 5322, CRLF included: 998
/// bytes of content plus the terminator.
const MESSAGE_LINE_LIMIT: usize = 1000;

/// A whole internet message: a header block plus an opaque body.
///
/// The body is never interpreted beyond its line discipline: every CR must
/// be followed by LF and every LF preceded by CR.
#[derive(Debug, Clone, Default)]
pub struct Message {
    headers: Headers,
    body: Bytes,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a complete message. The header block must end in the blank
    /// line; everything after it becomes the body.
    pub fn parse(raw: impl AsRef<[u8]>) -> Result<Self, MessageError> {
        let raw = raw.as_ref();
        let mut headers = Headers::new();
        headers.set_line_limit(Some(MESSAGE_LINE_LIMIT));
        let body_offset = match headers.parse(raw)? {
            ParseStatus::Complete(offset) => offset,
            ParseStatus::Incomplete(_) => return Err(MessageError::TruncatedHeaders),
        };
        if !headers.is_valid() {
            return Err(MessageError::InvalidName);
        }
        let body = &raw[body_offset..];
        check_line_discipline(body)?;
        Ok(Self { headers, body: Bytes::copy_from_slice(body) })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Emits the message: headers, blank line, body verbatim. Lines are
    /// never folded on the way out.
    pub fn generate(&self) -> Result<Bytes, EncodeError> {
        let mut raw = BytesMut::with_capacity(self.body.len() + 256);
        HeaderEncoder::new().encode_block(&self.headers, &mut raw)?;
        raw.extend_from_slice(&self.body);
        Ok(raw.freeze())
    }
}

// CR and LF may only appear in the body as a CRLF pair.
fn check_line_discipline(body: &[u8]) -> Result<(), MessageError> {
    let mut pending_cr = false;
    for &byte in body {
        match byte {
            b'\r' if pending_cr => return Err(MessageError::BareLineEnding { ending: "CR" }),
            b'\r' => pending_cr = true,
            b'\n' if pending_cr => pending_cr = false,
            b'\n' => return Err(MessageError::BareLineEnding { ending: "LF" }),
            _ if pending_cr => return Err(MessageError::BareLineEnding { ending: "CR" }),
            _ => {}
        }
    }
    if pending_cr {
        return Err(MessageError::BareLineEnding { ending: "CR" });
    }
    Ok(())
}
