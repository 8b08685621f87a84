use snafu::prelude::*;

use std::io::Error as IoError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    #[snafu(display("header line exceeds limit, length: {length}, limit: {limit}"))]
    LineTooLong { length: usize, limit: usize },

    #[snafu(display("header line has no colon delimiter: {line:?}"))]
    MissingColon { line: String },

    #[snafu(display("io error happens when parsing: {source}"), context(false))]
    Io { source: IoError },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EncodeError {
    #[snafu(display("no fold point within the {limit}-byte limit: {line:?}"))]
    FoldingImpossible { limit: usize, line: String },

    #[snafu(display("io error happens when serializing: {source}"), context(false))]
    Io { source: IoError },
}
