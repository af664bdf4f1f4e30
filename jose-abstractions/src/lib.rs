// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shared datatypes for the JOSE crates: the object model, the error
//! type, and the [`Crypt`] trait through which integrators supply the
//! cryptography.

mod crypt;
mod error;
mod model;

pub use crypt::{Crypt, CryptError, Flow};
pub use error::JoseError;
pub use model::{
    Encryption, Jose, JoseValue, Jwe, Jws, Recipient, Signature, JWE_AAD, JWE_CIPHERTEXT,
    JWE_EKEY, JWE_ENCRYPTION, JWE_IV, JWE_RECIPIENTS, JWE_TAG, JWE_UNPROTECTED, JWKS_KEYS,
    JWSE_CONTENT_TYPE, JWSE_HEADER, JWSE_PROTECTED, JWSE_TYPE, JWS_PAYLOAD, JWS_SIGNATURE,
    JWS_SIGNATURES,
};
