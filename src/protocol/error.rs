use thiserror::Error;

use crate::codec::DecodeError;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("header section error: {source}")]
    Headers {
        #[from]
        source: DecodeError,
    },

    #[error("message ends before the header terminator")]
    TruncatedHeaders,

    #[error("header name contains an illegal byte")]
    InvalidName,

    #[error("bare {ending} in message body")]
    BareLineEnding { ending: &'static str },
}
