use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use bytes::Bytes;

/// Case-insensitive header field name.
///
/// The stored bytes keep the casing they arrived with, so `ETag` serializes
/// back as `ETag`, while equality and hashing treat ASCII case as
/// insignificant. Construction accepts any byte sequence; the decoder is
/// the layer that polices the printable-ASCII charset on the wire.
#[derive(Debug, Clone, Default, Eq)]
pub struct HeaderName {
    raw: Bytes,
}

impl HeaderName {
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl AsRef<[u8]> for HeaderName {
    fn as_ref(&self) -> &[u8] {
        &self.raw
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, other: &Self) -> bool {
        self.raw.eq_ignore_ascii_case(&other.raw)
    }
}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.raw.eq_ignore_ascii_case(other.as_bytes())
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        self.raw.eq_ignore_ascii_case(other.as_bytes())
    }
}

impl PartialEq<HeaderName> for &str {
    fn eq(&self, other: &HeaderName) -> bool {
        other == self
    }
}

// Hashes the lowercased bytes so that equal names agree on their hash.
impl Hash for HeaderName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for &byte in self.raw.iter() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl From<Bytes> for HeaderName {
    fn from(raw: Bytes) -> Self {
        Self { raw }
    }
}

impl From<Vec<u8>> for HeaderName {
    fn from(raw: Vec<u8>) -> Self {
        Self { raw: Bytes::from(raw) }
    }
}

impl From<&[u8]> for HeaderName {
    fn from(raw: &[u8]) -> Self {
        Self { raw: Bytes::copy_from_slice(raw) }
    }
}

impl From<&str> for HeaderName {
    fn from(raw: &str) -> Self {
        Self { raw: Bytes::copy_from_slice(raw.as_bytes()) }
    }
}

impl From<String> for HeaderName {
    fn from(raw: String) -> Self {
        Self { raw: Bytes::from(raw.into_bytes()) }
    }
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.raw))
    }
}
