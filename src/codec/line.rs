use snafu::ensure;

use crate::codec::error::{DecodeError, LineTooLongSnafu};

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Outcome of scanning for the next line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    /// Byte offset of the CR opening the terminator.
    Terminator(usize),
    /// The buffer ends before the next terminator.
    Partial,
}

/// Stateless locator for CRLF-framed lines.
///
/// Polices the optional line-length limit, which counts every byte of the
/// physical line including the terminating CRLF. The unterminated tail is
/// held to the same bound: once it cannot fit a terminator under the limit,
/// waiting for more input would not help.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineScanner {
    limit: Option<usize>,
}

impl LineScanner {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    pub(crate) fn next_terminator(&self, raw: &[u8], offset: usize) -> Result<Scan, DecodeError> {
        match find_crlf(raw, offset) {
            Some(cr) => {
                let length = cr - offset + CRLF.len();
                if let Some(limit) = self.limit {
                    ensure!(length <= limit, LineTooLongSnafu { length, limit });
                }
                Ok(Scan::Terminator(cr))
            }
            None => {
                let length = raw.len().saturating_sub(offset) + CRLF.len();
                if let Some(limit) = self.limit {
                    ensure!(length <= limit, LineTooLongSnafu { length, limit });
                }
                Ok(Scan::Partial)
            }
        }
    }
}

/// Finds the next CRLF pair at or after `offset`, returning the position of
/// the CR. A lone CR or lone LF does not terminate a line.
pub(crate) fn find_crlf(raw: &[u8], offset: usize) -> Option<usize> {
    raw.get(offset..)?
        .windows(CRLF.len())
        .position(|pair| pair == CRLF)
        .map(|at| offset + at)
}
