// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! base64url helpers.
//!
//! JOSE base64url is unpadded on the wire, but decoding is indifferent to
//! padding so that inputs produced by stricter encoders still parse.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

const B64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub(crate) fn encode(data: &[u8]) -> String {
    B64URL.encode(data)
}

pub(crate) fn decode(text: &[u8]) -> Option<Vec<u8>> {
    B64URL.decode(text).ok()
}
