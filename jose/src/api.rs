// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Public entry points.

use jose_abstractions::{Crypt, Jose, JoseError};

use crate::options::DecodeOptions;

/// Decodes a JOSE structure of the declared media type `typ`, calling
/// back into `crypt` to verify signatures and decrypt content.
///
/// The media type selects the serialization: `jwt` and `jose` are
/// compact, `jose+json` is the JSON serialization, `jwk+json` and
/// `jwk-set+json` are keys, and anything else passes through as opaque
/// data. `level` bounds both JSON nesting and nested JOSE payloads.
pub fn decode(
    typ: Option<&str>,
    input: &[u8],
    crypt: &dyn Crypt,
    level: usize,
    options: &DecodeOptions,
) -> Result<Jose, JoseError> {
    crate::decode::decode(typ, input, crypt, level, options)
}

/// Serializes a JOSE structure, calling back into `crypt` to sign and
/// encrypt as the structure requires.
pub fn encode(jose: &mut Jose, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    crate::encode::encode(jose, crypt)
}
