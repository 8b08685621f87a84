//! Comma-list encoding for headers whose grammar permits `#`-lists, such as
//! `Accept-Language` or `Via`. Tokens are left exactly as found: callers
//! decide whether surrounding whitespace is significant.

use bytes::{BufMut, BytesMut};

use super::value::HeaderValue;

/// Splits a list-valued header on `,`.
///
/// Whitespace around tokens is preserved. Empty input yields no tokens; a
/// value without commas yields exactly one.
pub fn split(value: &HeaderValue) -> Vec<HeaderValue> {
    let raw = value.as_shared();
    if raw.is_empty() {
        return Vec::new();
    }
    let mut tokens = Vec::new();
    let mut token_start = 0;
    for (at, &byte) in raw.iter().enumerate() {
        if byte == b',' {
            tokens.push(HeaderValue::from_shared(raw.slice(token_start..at)));
            token_start = at + 1;
        }
    }
    tokens.push(HeaderValue::from_shared(raw.slice(token_start..)));
    tokens
}

/// Joins tokens with a bare `,`, the inverse of [`split`].
pub fn join<'a, I>(values: I) -> HeaderValue
where
    I: IntoIterator<Item = &'a HeaderValue>,
{
    let mut joined = BytesMut::new();
    for (index, value) in values.into_iter().enumerate() {
        if index > 0 {
            joined.put_u8(b',');
        }
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_shared(joined.freeze())
}
