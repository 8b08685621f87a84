use bytes::{BufMut, BytesMut};
use snafu::OptionExt;
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::error::{EncodeError, FoldingImpossibleSnafu};
use crate::codec::fold::fold_line;
use crate::codec::line::CRLF;
use crate::protocol::Headers;

/// Serializer for a header block, folding long lines when a limit is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder {
    limit: Option<usize>,
}

impl HeaderEncoder {
    pub fn new() -> Self {
        Self { limit: None }
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { limit }
    }

    /// Serializes the whole block into `dst`, final CRLF included.
    ///
    /// Every entry becomes `<name>": "<value>` plus CRLF, folded to the
    /// limit when one is set. A value with no fold point fails the whole
    /// block and leaves `dst` untouched.
    pub fn encode_block(&self, headers: &Headers, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let mut block = BytesMut::new();
        for header in headers.iter() {
            let mut line =
                BytesMut::with_capacity(header.name.len() + header.value.len() + 2 + CRLF.len());
            line.put_slice(header.name.as_bytes());
            line.put_slice(b": ");
            line.put_slice(header.value.as_bytes());
            line.put_slice(CRLF);

            match self.limit {
                Some(limit) => {
                    let parts = fold_line(&line, limit).with_context(|| {
                        let content = &line[..line.len() - CRLF.len()];
                        FoldingImpossibleSnafu {
                            limit,
                            line: String::from_utf8_lossy(content).into_owned(),
                        }
                    })?;
                    for part in parts {
                        block.put_slice(&part);
                    }
                }
                None => block.unsplit(line),
            }
        }
        block.put_slice(CRLF);
        trace!(block_size = block.len(), header_count = headers.len(), "encoded header block");
        dst.unsplit(block);
        Ok(())
    }
}

impl<'a> Encoder<&'a Headers> for HeaderEncoder {
    type Error = EncodeError;

    fn encode(&mut self, headers: &Headers, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encode_block(headers, dst)
    }
}
