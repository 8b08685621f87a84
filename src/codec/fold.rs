use crate::codec::line::CRLF;
use crate::protocol::value::is_wsp;

/// Offsets produced by one strategy call: the exclusive end of the part to
/// emit and where the next part starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Break {
    pub(crate) end: usize,
    pub(crate) next: usize,
}

/// One-shot line-breaking strategy honoring `limit` bytes per emitted part,
/// terminator included.
///
/// The first part reserves two bytes for the CRLF; later parts reserve a
/// third for the SP continuation prefix. Within that window the line's
/// first whitespace byte arms the breaker and every later one moves the
/// break point forward, so the cut lands on the last whitespace that still
/// fits. Returns `None` when no break point exists.
///
/// The closure carries the first-part flag across calls, so build a fresh
/// one per header line.
pub(crate) fn folding_strategy(limit: usize) -> impl FnMut(&[u8], usize) -> Option<Break> {
    let mut first_part = true;
    move |line: &[u8], start: usize| {
        if line.len() - start <= limit {
            return Some(Break { end: line.len(), next: line.len() });
        }
        let reserved = if first_part { 2 } else { 3 };
        let window_end = (start + limit).checked_sub(reserved)?;
        let mut break_at = start;
        for at in start..=window_end {
            if is_wsp(line[at]) {
                if first_part {
                    first_part = false;
                } else {
                    break_at = at;
                }
            }
        }
        if break_at == start {
            return None;
        }
        Some(Break { end: break_at, next: break_at + 1 })
    }
}

/// Splits `line` into parts as directed by `strategy`, prefixing every part
/// after the first with `continuator` and terminating each part with
/// `terminator`. Returns `None` as soon as the strategy finds no break.
pub(crate) fn split_line(
    line: &[u8],
    terminator: &[u8],
    continuator: &[u8],
    mut strategy: impl FnMut(&[u8], usize) -> Option<Break>,
) -> Option<Vec<Vec<u8>>> {
    let mut parts = Vec::new();
    let mut start = 0;
    while start < line.len() {
        let stop = strategy(line, start)?;
        let mut part = Vec::with_capacity(stop.end - start + continuator.len() + terminator.len());
        if start != 0 {
            part.extend_from_slice(continuator);
        }
        part.extend_from_slice(&line[start..stop.end]);
        if !part.ends_with(terminator) {
            part.extend_from_slice(terminator);
        }
        parts.push(part);
        start = stop.next;
    }
    Some(parts)
}

/// Folds one raw header line (already CRLF-terminated) to the given limit.
pub(crate) fn fold_line(line: &[u8], limit: usize) -> Option<Vec<Vec<u8>>> {
    split_line(line, CRLF, b" ", folding_strategy(limit))
}
