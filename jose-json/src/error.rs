// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Decode failures, reported with the byte offset at which scanning stopped.

use std::fmt;

/// The reason a JSON document failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonErrorKind {
    /// An unexpected or malformed character was found.
    BadChar,
    /// The input ended before the current construct was complete.
    Eof,
    /// Values were nested more deeply than the caller's level budget allows.
    NestingTooDeep,
}

impl fmt::Display for JsonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonErrorKind::BadChar => f.write_str("bad character"),
            JsonErrorKind::Eof => f.write_str("unexpected end of input"),
            JsonErrorKind::NestingTooDeep => f.write_str("too many nested values"),
        }
    }
}

/// A JSON decode error together with the byte offset into the input at
/// which the decoder gave up.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct JsonError {
    pub kind: JsonErrorKind,
    pub offset: usize,
}
