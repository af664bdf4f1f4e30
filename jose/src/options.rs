// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Options accepted by [`crate::decode`].

/// Controls what a successful decode returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Retain the full JWS/JWE wrapper structure, with the decoded payload
    /// nested inside it, instead of collapsing to the innermost payload.
    pub decode_all: bool,
}
