use bytes::{Bytes, BytesMut};

use crate::codec::{DecodeError, EncodeError, HeaderDecoder, HeaderEncoder, ParseStatus};
use crate::protocol::list;
use crate::protocol::name::HeaderName;
use crate::protocol::value::HeaderValue;

/// One stored (name, value) entry. Duplicate names are independent entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: HeaderName,
    pub value: HeaderValue,
}

impl Header {
    pub fn new(name: impl Into<HeaderName>, value: impl Into<HeaderValue>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Ordered header collection with case-insensitive name lookups.
///
/// Entries stay in insertion order, including the relative order of entries
/// sharing a name. The collection also carries the two knobs shared between
/// parsing and serialization: the physical line-length limit and the
/// validity latch tripped by malformed input.
#[derive(Debug, Clone)]
pub struct Headers {
    entries: Vec<Header>,
    line_limit: Option<usize>,
    valid: bool,
}

impl Default for Headers {
    fn default() -> Self {
        Self { entries: Vec::new(), line_limit: None, valid: true }
    }
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, in insertion order.
    pub fn all(&self) -> &[Header] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, name: impl AsRef<[u8]>) -> bool {
        self.matching(name.as_ref()).next().is_some()
    }

    /// The first matching entry's value.
    pub fn value(&self, name: impl AsRef<[u8]>) -> Option<&HeaderValue> {
        let name = name.as_ref();
        self.entries
            .iter()
            .find(|entry| entry.name.as_bytes().eq_ignore_ascii_case(name))
            .map(|entry| &entry.value)
    }

    /// Every matching value, in insertion order.
    pub fn values(&self, name: impl AsRef<[u8]>) -> Vec<HeaderValue> {
        self.matching(name.as_ref()).map(|entry| entry.value.clone()).collect()
    }

    /// Comma-split tokens over every matching value, flattened in insertion
    /// order. Tokens keep their surrounding whitespace.
    pub fn tokens(&self, name: impl AsRef<[u8]>) -> Vec<HeaderValue> {
        self.matching(name.as_ref()).flat_map(|entry| list::split(&entry.value)).collect()
    }

    /// Replaces the first matching entry's value in place and erases every
    /// later match. Appends a new entry when no match exists.
    pub fn set(&mut self, name: impl Into<HeaderName>, value: impl Into<HeaderValue>) {
        let name = name.into();
        let value = value.into();
        let mut replaced = false;
        self.entries.retain_mut(|entry| {
            if entry.name != name {
                return true;
            }
            if replaced {
                return false;
            }
            entry.value = value.clone();
            replaced = true;
            true
        });
        if !replaced {
            self.entries.push(Header { name, value });
        }
    }

    /// Multi-valued [`set`](Self::set). With `one_line` the values are
    /// joined with `,` into a single entry; otherwise the first value lands
    /// at the first-match position and the rest append at the tail. An empty
    /// list is a no-op.
    pub fn set_multi<I, V>(&mut self, name: impl Into<HeaderName>, values: I, one_line: bool)
    where
        I: IntoIterator<Item = V>,
        V: Into<HeaderValue>,
    {
        let name = name.into();
        let values: Vec<HeaderValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return;
        }
        if one_line {
            self.set(name, list::join(&values));
        } else {
            let mut values = values.into_iter();
            if let Some(first) = values.next() {
                self.set(name.clone(), first);
            }
            for value in values {
                self.add(name.clone(), value);
            }
        }
    }

    /// Appends a new entry at the tail, regardless of existing matches.
    pub fn add(&mut self, name: impl Into<HeaderName>, value: impl Into<HeaderValue>) {
        self.entries.push(Header::new(name, value));
    }

    /// Multi-valued [`add`](Self::add): one joined entry with `one_line`,
    /// one entry per value otherwise. An empty list is a no-op.
    pub fn add_multi<I, V>(&mut self, name: impl Into<HeaderName>, values: I, one_line: bool)
    where
        I: IntoIterator<Item = V>,
        V: Into<HeaderValue>,
    {
        let name = name.into();
        let values: Vec<HeaderValue> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return;
        }
        if one_line {
            self.add(name, list::join(&values));
        } else {
            for value in values {
                self.add(name.clone(), value);
            }
        }
    }

    /// Erases every entry matching `name`.
    pub fn remove(&mut self, name: impl AsRef<[u8]>) {
        let name = name.as_ref();
        self.entries.retain(|entry| !entry.name.as_bytes().eq_ignore_ascii_case(name));
    }

    /// Caps the length of every parsed or emitted physical line, CRLF
    /// included. `None` disables the limit.
    pub fn set_line_limit(&mut self, limit: Option<usize>) {
        self.line_limit = limit;
    }

    pub fn line_limit(&self) -> Option<usize> {
        self.line_limit
    }

    /// False once the parser has seen a name outside the printable-ASCII
    /// charset or any framing violation. Latches; never resets.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Parses a header block from the start of `raw`, appending entries to
    /// this collection. See [`HeaderDecoder::decode_at`].
    pub fn parse(&mut self, raw: impl AsRef<[u8]>) -> Result<ParseStatus, DecodeError> {
        self.parse_from(raw, 0)
    }

    /// Parses from `start`, the resume point returned by a previous
    /// `Incomplete`.
    pub fn parse_from(
        &mut self,
        raw: impl AsRef<[u8]>,
        start: usize,
    ) -> Result<ParseStatus, DecodeError> {
        HeaderDecoder::with_limit(self.line_limit).decode_at(raw.as_ref(), start, self)
    }

    /// Serializes the block, final CRLF included, folding long lines when a
    /// line limit is set. A line with no fold point fails the whole block.
    pub fn serialize(&self) -> Result<Bytes, EncodeError> {
        let mut block = BytesMut::new();
        HeaderEncoder::with_limit(self.line_limit).encode_block(self, &mut block)?;
        Ok(block.freeze())
    }

    pub(crate) fn mark_invalid(&mut self) {
        self.valid = false;
    }

    pub(crate) fn push_entry(&mut self, entry: Header) {
        self.entries.push(entry);
    }

    fn matching<'a>(&'a self, name: &'a [u8]) -> impl Iterator<Item = &'a Header> {
        self.entries.iter().filter(move |entry| entry.name.as_bytes().eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
