//! Parsing, manipulation, and serialization of internet-message header
//! blocks, the CRLF-framed section shared by mail (RFC 5322), HTTP/1.x
//! (RFC 7230), and SIP (RFC 3261).
//!
//! The crate owns the header section only: bodies are opaque bytes left to
//! the caller. [`Headers`] is the ordered, case-insensitively keyed store;
//! [`codec`] holds the streaming decoder and the folding encoder that move
//! it on and off the wire.

pub mod codec;
pub mod protocol;

pub use codec::{DecodeError, EncodeError, HeaderDecoder, HeaderEncoder, ParseStatus};
pub use protocol::{Header, HeaderName, HeaderValue, Headers, Message, MessageError};
