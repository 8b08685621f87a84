mod error;
mod fold;
mod header_decoder;
mod header_encoder;
mod line;

pub use error::{DecodeError, EncodeError};
pub use header_decoder::{HeaderDecoder, ParseStatus};
pub use header_encoder::HeaderEncoder;
