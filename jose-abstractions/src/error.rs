// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The error type shared by the decode and encode engines.

use jose_json::JsonError;

use crate::crypt::CryptError;

/// A JOSE decode or encode failure.
///
/// Message text is written for humans; match on the variant to tell the
/// classes of failure apart programmatically.
#[derive(thiserror::Error, Debug)]
pub enum JoseError {
    /// Malformed base64url or compact-serialization segment structure.
    #[error("{message}")]
    Syntax { message: String },

    /// A JSON document inside the structure failed to decode.
    #[error("{context} at offset {}: {}", .source.offset, .source.kind)]
    Json { context: String, source: JsonError },

    /// A required member was missing, had the wrong JSON type, or a
    /// header parameter appeared in more than one header.
    #[error("{message}")]
    Structure { message: String },

    /// Nested payloads exceeded the caller's level budget.
    #[error("Syntax error: too many nested JOSE payloads")]
    NestingTooDeep,

    /// An operation was required but the [`crate::Crypt`] implementation
    /// does not provide it.
    #[error("{operation} failed: no {callback} callback provided")]
    NoCallback {
        operation: &'static str,
        callback: &'static str,
    },

    /// No signature was accepted by the verify callback.
    #[error("{message}")]
    Verification { message: String },

    /// No recipient could be decrypted.
    #[error("{message}")]
    Decryption { message: String },

    /// The sign callback failed while encoding.
    #[error("JWS signing failed: {source}")]
    Signing { source: CryptError },

    /// The encrypt callback failed while encoding.
    #[error("JWE encryption failed: {source}")]
    Encryption { source: CryptError },

    /// The value has no serialized form (for example an empty `Jose`).
    #[error("JOSE type not recognised")]
    NotImplemented,
}

impl JoseError {
    pub fn syntax(message: impl Into<String>) -> Self {
        JoseError::Syntax {
            message: message.into(),
        }
    }

    pub fn structure(message: impl Into<String>) -> Self {
        JoseError::Structure {
            message: message.into(),
        }
    }

    pub fn json(context: impl Into<String>, source: JsonError) -> Self {
        JoseError::Json {
            context: context.into(),
            source,
        }
    }

    pub fn verification(message: impl Into<String>) -> Self {
        JoseError::Verification {
            message: message.into(),
        }
    }

    pub fn decryption(message: impl Into<String>) -> Self {
        JoseError::Decryption {
            message: message.into(),
        }
    }

    pub fn no_callback(operation: &'static str, callback: &'static str) -> Self {
        JoseError::NoCallback {
            operation,
            callback,
        }
    }
}
