// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! JOSE (JSON Object Signing and Encryption) decoding and encoding.
//!
//! This crate handles the structure side of RFC 7515 (JWS), RFC 7516
//! (JWE), RFC 7517 (JWK) and RFC 7519 (JWT): parsing and assembling the
//! compact and JSON serializations, reconstructing the exact bytes that
//! are signed or encrypted, and walking nested structures such as a
//! signed-then-encrypted token. All cryptography is delegated to a
//! caller-supplied [`Crypt`] implementation, which owns algorithm
//! selection and key handling.
//!
//! Decoding a compact JWT:
//!
//! ```no_run
//! use jose::{decode, Crypt, DecodeOptions};
//!
//! struct MyCrypt; // implements Crypt
//! # impl Crypt for MyCrypt {}
//!
//! let token = b"eyJhbGciOiJub25lIn0.eyJpc3MiOiJqb2UifQ.";
//! let jose = decode(Some("JWT"), token, &MyCrypt, 10, &DecodeOptions::default())?;
//! # Ok::<(), jose::JoseError>(())
//! ```

mod api;
mod b64;
mod decode;
mod encode;
mod options;

pub use api::{decode, encode};
pub use options::DecodeOptions;

pub use jose_abstractions::{
    Crypt, CryptError, Encryption, Flow, Jose, JoseError, JoseValue, Jwe, Jws, Recipient,
    Signature,
};

/// The JSON value model used throughout the JOSE types.
pub use jose_json as json;
