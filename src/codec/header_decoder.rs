use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::error::{DecodeError, MissingColonSnafu};
use crate::codec::line::{find_crlf, LineScanner, Scan, CRLF};
use crate::protocol::value::{is_wsp, trim_wsp, trim_wsp_start};
use crate::protocol::{Header, HeaderName, HeaderValue, Headers};

/// Where a parse stopped. Both variants carry a byte offset into the input:
/// the first body byte on `Complete`, the resume point on `Incomplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The blank-line terminator was seen; the header block is whole.
    Complete(usize),
    /// The input ended mid-block. Feed more bytes and parse again from the
    /// attached offset.
    Incomplete(usize),
}

impl ParseStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseStatus::Complete(_))
    }

    pub fn offset(&self) -> usize {
        match *self {
            ParseStatus::Complete(offset) | ParseStatus::Incomplete(offset) => offset,
        }
    }
}

/// Streaming parser for a CRLF-framed header block.
///
/// Holds no state between calls: incomplete input is reported through
/// [`ParseStatus::Incomplete`] and the caller retries once more bytes have
/// arrived.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder {
    limit: Option<usize>,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self { limit: None }
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self { limit }
    }

    /// Parses header lines from `raw` starting at `start`, pushing each
    /// finished entry into `headers`.
    ///
    /// A name with bytes outside 33..=126 (or no bytes at all) trips the
    /// collection's validity latch but parsing carries on and the entry is
    /// still stored. A line with no colon, or one over the length limit,
    /// trips the latch and fails the parse.
    pub fn decode_at(
        &self,
        raw: &[u8],
        start: usize,
        headers: &mut Headers,
    ) -> Result<ParseStatus, DecodeError> {
        let scanner = LineScanner::new(self.limit);
        let mut offset = start;
        while offset < raw.len() {
            let line_start = offset;
            let mut line_end = match scanner.next_terminator(raw, offset) {
                Ok(Scan::Terminator(cr)) => cr,
                Ok(Scan::Partial) => break,
                Err(error) => {
                    headers.mark_invalid();
                    return Err(error);
                }
            };

            // blank line closes the header block
            if line_end == offset {
                offset += CRLF.len();
                return Ok(ParseStatus::Complete(offset));
            }

            let line = &raw[offset..line_end];
            let colon = match line.iter().position(|&byte| byte == b':') {
                Some(at) => at,
                None => {
                    headers.mark_invalid();
                    return MissingColonSnafu { line: String::from_utf8_lossy(line).into_owned() }
                        .fail();
                }
            };

            let name = HeaderName::from(&line[..colon]);
            if !valid_name(name.as_bytes()) {
                headers.mark_invalid();
            }

            let mut value = trim_wsp(&line[colon + 1..]).to_vec();
            offset = line_end + CRLF.len();

            // Unfold: a following line that opens with WSP and carries more
            // than two bytes extends this value, the fold collapsing to a
            // single SP. The lookahead needs the next terminator to exist,
            // so a buffer ending mid-value reports Incomplete at the start
            // of the in-progress header, which is not stored; the retry
            // re-reads the whole logical line.
            loop {
                let next_start = line_end + CRLF.len();
                let next_end = match find_crlf(raw, next_start) {
                    Some(cr) => cr,
                    None => return Ok(ParseStatus::Incomplete(line_start)),
                };
                let next_line = &raw[next_start..next_end];
                if next_line.len() > 2 && is_wsp(next_line[0]) {
                    value.push(b' ');
                    value.extend_from_slice(trim_wsp_start(next_line));
                    offset = next_end + CRLF.len();
                    line_end = next_end;
                } else {
                    break;
                }
            }

            let value = HeaderValue::from(trim_wsp(&value));
            headers.push_entry(Header { name, value });
        }
        Ok(ParseStatus::Incomplete(offset))
    }
}

// Printable ASCII, 33..=126. The empty name is out too.
fn valid_name(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|byte| byte.is_ascii_graphic())
}

impl Decoder for HeaderDecoder {
    type Item = Headers;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut headers = Headers::new();
        headers.set_line_limit(self.limit);
        match self.decode_at(src.as_ref(), 0, &mut headers)? {
            ParseStatus::Complete(body_offset) => {
                trace!(body_offset, header_count = headers.len(), "decoded header block");
                src.advance(body_offset);
                Ok(Some(headers))
            }
            ParseStatus::Incomplete(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_curl_request_block() {
        let raw = concat!(
            "User-Agent: curl/7.16.3 libcurl/7.163 OpenSSL/0.9.7l zlib/1.2.3\r\n",
            "Host: www.example.com\r\n",
            "Accept-Language: en, mi\r\n",
            "\r\n",
        );
        let mut headers = Headers::new();
        let status = headers.parse(raw).unwrap();
        assert_eq!(status, ParseStatus::Complete(raw.len()));
        assert!(headers.is_valid());

        let entries: Vec<(String, String)> = headers
            .iter()
            .map(|entry| (entry.name.to_string(), entry.value.to_string()))
            .collect();
        assert_eq!(
            entries,
            [
                (
                    "User-Agent".to_string(),
                    "curl/7.16.3 libcurl/7.163 OpenSSL/0.9.7l zlib/1.2.3".to_string()
                ),
                ("Host".to_string(), "www.example.com".to_string()),
                ("Accept-Language".to_string(), "en, mi".to_string()),
            ]
        );
        assert!(headers.has("Host"));
        assert!(!headers.has("Toto"));
    }

    #[test]
    fn unfolds_continuation_lines_to_a_single_space() {
        let raw = concat!("Subject: This\r\n", " is a test\r\n", "\r\n");
        let mut headers = Headers::new();
        let status = headers.parse(raw).unwrap();
        assert_eq!(status, ParseStatus::Complete(raw.len()));
        assert_eq!(headers.value("Subject"), Some(&HeaderValue::from("This is a test")));
    }

    #[test]
    fn unfolding_consumes_all_leading_wsp() {
        let raw = concat!("Subject: This\r\n", " \t   is a test\r\n", "\r\n");
        let mut headers = Headers::new();
        headers.parse(raw).unwrap();
        assert_eq!(headers.value("Subject"), Some(&HeaderValue::from("This is a test")));
    }

    #[test]
    fn empty_input_is_incomplete() {
        let mut headers = Headers::new();
        assert_eq!(headers.parse("").unwrap(), ParseStatus::Incomplete(0));
    }

    #[test]
    fn block_without_terminator_is_incomplete() {
        let mut headers = Headers::new();
        let status = headers.parse("Host: www.example.com\r\n").unwrap();
        // the lookahead could not rule out a folded continuation, so the
        // whole header stays in progress
        assert_eq!(status, ParseStatus::Incomplete(0));
        assert!(headers.is_empty());
    }

    #[test]
    fn incomplete_parse_resumes_at_the_returned_offset() {
        let first = "Host: www.example.com\r\nAccept: */*\r\n";
        let full = "Host: www.example.com\r\nAccept: */*\r\n\r\nbody";

        let mut headers = Headers::new();
        let status = headers.parse(first).unwrap();
        // Host is finished; Accept still awaits its lookahead
        assert_eq!(status, ParseStatus::Incomplete(23));
        assert_eq!(headers.len(), 1);

        let status = headers.parse_from(full, status.offset()).unwrap();
        assert_eq!(status, ParseStatus::Complete(full.len() - 4));
        assert_eq!(headers.value("Host"), Some(&HeaderValue::from("www.example.com")));
        assert_eq!(headers.value("Accept"), Some(&HeaderValue::from("*/*")));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn line_without_colon_fails_and_latches() {
        let raw = concat!("Host: www.example.com\r\n", "this line has no delimiter\r\n", "\r\n");
        let mut headers = Headers::new();
        let error = headers.parse(raw).unwrap_err();
        assert!(matches!(error, DecodeError::MissingColon { .. }));
        assert!(!headers.is_valid());
        // the entries before the bad line were kept
        assert!(headers.has("Host"));
    }

    #[test]
    fn bad_name_byte_latches_but_parsing_continues() {
        let raw = concat!("Feels Bad: yes\r\n", "Host: www.example.com\r\n", "\r\n");
        let mut headers = Headers::new();
        let status = headers.parse(raw).unwrap();
        assert_eq!(status, ParseStatus::Complete(raw.len()));
        assert!(!headers.is_valid());
        // the offending entry is stored anyway
        assert_eq!(headers.value("Feels Bad"), Some(&HeaderValue::from("yes")));
        assert!(headers.has("Host"));
    }

    #[test]
    fn empty_name_latches() {
        let raw = ": no name\r\n\r\n";
        let mut headers = Headers::new();
        let status = headers.parse(raw).unwrap();
        assert_eq!(status, ParseStatus::Complete(raw.len()));
        assert!(!headers.is_valid());
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn line_limit_is_enforced_inclusive_of_crlf() {
        // 998 bytes of content + CRLF = exactly 1000
        let raw_ok = format!("X-Poggers: {}\r\n\r\n", "X".repeat(987));
        let mut headers = Headers::new();
        headers.set_line_limit(Some(1000));
        assert!(headers.parse(&raw_ok).unwrap().is_complete());
        assert!(headers.is_valid());

        // one more byte of content makes 1001
        let raw_over = format!("X-Poggers: {}\r\n\r\n", "X".repeat(988));
        let mut headers = Headers::new();
        headers.set_line_limit(Some(1000));
        let error = headers.parse(&raw_over).unwrap_err();
        assert!(matches!(error, DecodeError::LineTooLong { length: 1001, limit: 1000 }));
        assert!(!headers.is_valid());
    }

    #[test]
    fn long_lines_pass_without_a_limit() {
        let value = "X".repeat(4096);
        let raw = format!("X-Poggers: {value}\r\n\r\n");
        let mut headers = Headers::new();
        assert!(headers.parse(&raw).unwrap().is_complete());
        assert_eq!(headers.value("X-Poggers"), Some(&HeaderValue::from(value.as_str())));
    }

    #[test]
    fn unterminated_tail_over_the_limit_fails() {
        let mut headers = Headers::new();
        headers.set_line_limit(Some(10));
        let error = headers.parse("X-Long: aaaaaaaaaa").unwrap_err();
        assert!(matches!(error, DecodeError::LineTooLong { .. }));
        assert!(!headers.is_valid());
    }

    #[test]
    fn folded_sip_via_headers_keep_their_order() {
        let raw = concat!(
            "Via: SIP/2.0/UDP server10.biloxi.com\r\n",
            "    ;branch=z9hG4bKnashds8;received=192.0.2.3\r\n",
            "Via: SIP/2.0/UDP bigbox3.site3.atlanta.com\r\n",
            "    ;branch=z9hG4bK77ef4c2312983.1;received=192.0.2.2\r\n",
            "Via: SIP/2.0/UDP pc33.atlanta.com\r\n",
            "    ;branch=z9hG4bK776asdhds;received=192.0.2.1\r\n",
            "To: Bob <sip:bob@biloxi.com>;tag=a6c85cf\r\n",
            "From: Alice <sip:alice@atlanta.com>;tag=1928301774\r\n",
            "\r\n",
        );
        let mut headers = Headers::new();
        assert!(headers.parse(raw).unwrap().is_complete());

        let vias = headers.values("Via");
        assert_eq!(
            vias,
            vec![
                HeaderValue::from(
                    "SIP/2.0/UDP server10.biloxi.com ;branch=z9hG4bKnashds8;received=192.0.2.3"
                ),
                HeaderValue::from(
                    "SIP/2.0/UDP bigbox3.site3.atlanta.com ;branch=z9hG4bK77ef4c2312983.1;received=192.0.2.2"
                ),
                HeaderValue::from(
                    "SIP/2.0/UDP pc33.atlanta.com ;branch=z9hG4bK776asdhds;received=192.0.2.1"
                ),
            ]
        );
        assert_eq!(headers.values("From").len(), 1);
        assert!(headers.values("Nonexistent").is_empty());
    }

    #[test]
    fn pending_fold_reports_incomplete_without_storing() {
        let raw = "Subject: This\r\n is a ";
        let mut headers = Headers::new();
        let status = headers.parse(raw).unwrap();
        assert_eq!(status, ParseStatus::Incomplete(0));
        assert!(!headers.has("Subject"));
    }

    #[test]
    fn short_wsp_stub_is_not_a_continuation() {
        // a WSP-led line of two bytes or fewer ends the value instead of
        // extending it, and then fails to parse as a header line
        let raw = "Subject: This\r\n a\r\n\r\n";
        let mut headers = Headers::new();
        let error = headers.parse(raw).unwrap_err();
        assert!(matches!(error, DecodeError::MissingColon { .. }));
        assert_eq!(headers.value("Subject"), Some(&HeaderValue::from("This")));
    }

    #[test]
    fn streaming_decoder_waits_for_the_full_block() {
        let mut decoder = HeaderDecoder::new();
        let mut buffer = BytesMut::from("Host: www.example.com\r\n");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"Accept: */*\r\n\r\nrest of the message");
        let headers = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.value("Accept"), Some(&HeaderValue::from("*/*")));
        // the buffer was advanced to the body
        assert_eq!(&buffer[..], b"rest of the message");
    }

    #[test]
    fn streaming_decoder_rejects_oversized_lines() {
        let mut decoder = HeaderDecoder::with_limit(Some(16));
        let mut buffer = BytesMut::from("X-Way-Too-Long: aaaaaaaaaaaaaaaaaaaa\r\n\r\n");
        assert!(decoder.decode(&mut buffer).is_err());
    }
}
