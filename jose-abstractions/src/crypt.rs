// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The trait seam between JOSE structure handling and cryptography.
//!
//! This library parses, assembles and serializes JOSE structures; it
//! performs no cryptography of its own. Integrators implement [`Crypt`]
//! and the engines call back into it with the exact bytes to sign, verify,
//! encrypt or decrypt. Every method has a default body that reports the
//! operation as not provided, so an implementation only overrides what it
//! supports.

use jose_json::JsonValue;

use crate::model::{Encryption, Recipient, Signature};

/// Loop control for multi-signature and multi-recipient processing.
///
/// A verify or decrypt callback may set this to [`Flow::Break`] to stop
/// the decoder from evaluating any further entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Break,
}

/// A failure reported by a [`Crypt`] implementation.
#[derive(thiserror::Error, Debug)]
pub enum CryptError {
    /// The integrator supplied no implementation for this operation.
    #[error("no {0} callback provided")]
    NotProvided(&'static str),
    /// The operation was attempted and failed, or the algorithm named in
    /// the header is not on the implementation's allow list.
    #[error("{0}")]
    Message(String),
}

/// Cryptographic callbacks invoked by the decode and encode engines.
///
/// # Contract
///
/// Implementations are responsible for algorithm selection: read the
/// `alg`/`enc` parameters from the headers carried on the [`Signature`],
/// [`Recipient`] and [`Encryption`] arguments, and reject anything not on
/// an explicit allow list. In particular, never let the header alone
/// choose `none`.
///
/// `verify` and `decrypt` failures on one entry do not abort a decode;
/// the engine records the outcome and moves on to the next signature or
/// recipient. Returning [`CryptError::NotProvided`] aborts instead, as it
/// means no implementation exists at all.
pub trait Crypt {
    /// Produces a signature over `signing_input`, the ASCII bytes of
    /// `BASE64URL(protected header) || '.' || BASE64URL(payload)`.
    ///
    /// The result is written to `signature.signature`; an `alg` of `none`
    /// leaves it empty.
    fn sign(&self, signing_input: &[u8], signature: &mut Signature) -> Result<(), CryptError> {
        let _ = (signing_input, signature);
        Err(CryptError::NotProvided("sign"))
    }

    /// Checks `signature.signature` over `signing_input`. For input
    /// decoded from the wire, `signing_input` is a slice of the original
    /// document, not a re-encoding.
    fn verify(
        &self,
        signing_input: &[u8],
        signature: &Signature,
        flow: &mut Flow,
    ) -> Result<(), CryptError> {
        let _ = (signing_input, signature, flow);
        Err(CryptError::NotProvided("verify"))
    }

    /// Encrypts `plaintext`, filling in `recipient.encrypted_key` and the
    /// `iv`, `ciphertext` and `tag` fields of `encryption`.
    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &mut Recipient,
        encryption: &mut Encryption,
    ) -> Result<(), CryptError> {
        let _ = (plaintext, recipient, encryption);
        Err(CryptError::NotProvided("encrypt"))
    }

    /// Decrypts `encryption.ciphertext` for one recipient and returns the
    /// plaintext.
    ///
    /// `header` is the full JOSE header reconstructed from the protected,
    /// shared unprotected and per-recipient headers. `protected64` and
    /// `aad64` are the wire base64url texts needed to rebuild the
    /// additional authenticated data, empty when absent.
    fn decrypt(
        &self,
        recipient: &Recipient,
        encryption: &Encryption,
        header: &JsonValue,
        protected64: &str,
        aad64: &str,
        flow: &mut Flow,
    ) -> Result<Vec<u8>, CryptError> {
        let _ = (recipient, encryption, header, protected64, aad64, flow);
        Err(CryptError::NotProvided("decrypt"))
    }
}
