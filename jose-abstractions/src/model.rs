// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The JOSE object model.
//!
//! A [`Jose`] value is one of the JOSE flavours defined by RFC 7515/7516/
//! 7517/7519 (JWS, JWE, JWK, JWK set, JWT) or a plain payload (raw data,
//! text, or generic JSON) reached at the bottom of a nested structure.
//! Signed and encrypted values can wrap a nested `Jose` payload, which is
//! how a signed-then-encrypted token is represented.

use jose_json::JsonValue;

// JOSE header parameter and serialization member names (RFC 7515/7516).
pub const JWSE_TYPE: &str = "typ";
pub const JWSE_CONTENT_TYPE: &str = "cty";
pub const JWSE_PROTECTED: &str = "protected";
pub const JWSE_HEADER: &str = "header";
pub const JWS_PAYLOAD: &str = "payload";
pub const JWS_SIGNATURE: &str = "signature";
pub const JWS_SIGNATURES: &str = "signatures";
pub const JWE_ENCRYPTION: &str = "enc";
pub const JWE_UNPROTECTED: &str = "unprotected";
pub const JWE_CIPHERTEXT: &str = "ciphertext";
pub const JWE_IV: &str = "iv";
pub const JWE_TAG: &str = "tag";
pub const JWE_AAD: &str = "aad";
pub const JWE_EKEY: &str = "encrypted_key";
pub const JWE_RECIPIENTS: &str = "recipients";
pub const JWKS_KEYS: &str = "keys";

/// A JOSE value of any flavour, with its declared media types.
#[derive(Debug, Clone, Default)]
pub struct Jose {
    /// Media type of the complete value, as passed in or taken from the
    /// `typ` header parameter.
    pub typ: Option<String>,
    /// Content type of the nested payload, from the `cty` header
    /// parameter. `"JWT"` on a JWT value.
    pub cty: Option<String>,
    pub value: JoseValue,
}

#[derive(Debug, Clone, Default)]
pub enum JoseValue {
    /// A single JSON Web Key.
    Jwk { key: JsonValue },
    /// A JSON Web Key set.
    Jwks { keys: JsonValue },
    /// A JWS in compact serialization.
    Jws(Jws),
    /// A JWS in JSON serialization, general or flattened.
    JwsJson(Jws),
    /// A JWE in compact serialization.
    Jwe(Jwe),
    /// A JWE in JSON serialization, general or flattened.
    JweJson(Jwe),
    /// A decoded JWT claims set.
    Jwt { claims: JsonValue },
    /// An opaque binary payload.
    Data { data: Vec<u8> },
    /// A text payload.
    Text { text: String },
    /// A generic JSON payload.
    Json { json: JsonValue },
    #[default]
    None,
}

/// A JWS signature: one entry of the `signatures` array in the general
/// serialization, or the single signature of the compact and flattened
/// forms.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    /// The unprotected `header` member, if any.
    pub header: Option<JsonValue>,
    /// The integrity-protected header.
    pub protected_header: Option<JsonValue>,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
    /// Set during decode: whether the verify callback accepted this
    /// signature.
    pub verified: Option<bool>,
}

impl Signature {
    pub fn new(header: Option<JsonValue>, protected_header: Option<JsonValue>) -> Self {
        Signature {
            header,
            protected_header,
            signature: Vec::new(),
            verified: None,
        }
    }
}

/// A JWE recipient: one entry of the `recipients` array, or the single
/// recipient of the compact and flattened forms.
#[derive(Debug, Clone, Default)]
pub struct Recipient {
    /// The per-recipient unprotected header, if any.
    pub header: Option<JsonValue>,
    /// The encrypted content-encryption key for this recipient.
    pub encrypted_key: Vec<u8>,
    /// Set during decode: whether the decrypt callback succeeded for
    /// this recipient.
    pub decrypted: Option<bool>,
}

impl Recipient {
    pub fn new(header: Option<JsonValue>) -> Self {
        Recipient {
            header,
            encrypted_key: Vec::new(),
            decrypted: None,
        }
    }
}

/// The parts of a JWE shared by every recipient.
#[derive(Debug, Clone, Default)]
pub struct Encryption {
    /// The integrity-protected header.
    pub protected_header: Option<JsonValue>,
    /// The base64url text of the protected header exactly as it appeared
    /// on the wire, kept for additional-authenticated-data reconstruction.
    pub protected64: Option<String>,
    /// The shared unprotected header, if any.
    pub unprotected_header: Option<JsonValue>,
    /// Additional authenticated data, empty when absent.
    pub aad: Vec<u8>,
    /// The base64url text of the `aad` member as it appeared on the wire.
    pub aad64: Option<String>,
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl Encryption {
    pub fn new(
        unprotected_header: Option<JsonValue>,
        protected_header: Option<JsonValue>,
    ) -> Self {
        Encryption {
            protected_header,
            unprotected_header,
            ..Encryption::default()
        }
    }
}

/// A signed value, possibly wrapping a nested payload.
#[derive(Debug, Clone, Default)]
pub struct Jws {
    /// The single signature of the compact and flattened forms.
    pub signature: Option<Signature>,
    /// The `signatures` array of the general JSON serialization.
    pub signatures: Option<Vec<Signature>>,
    /// The nested payload, present on encode and after a decode that was
    /// asked to retain the wrapper structure.
    pub payload: Option<Box<Jose>>,
}

/// An encrypted value, possibly wrapping a nested payload.
#[derive(Debug, Clone, Default)]
pub struct Jwe {
    /// The single recipient of the compact and flattened forms.
    pub recipient: Option<Recipient>,
    /// The `recipients` array of the general JSON serialization.
    pub recipients: Option<Vec<Recipient>>,
    pub encryption: Encryption,
    pub payload: Option<Box<Jose>>,
}

impl Jose {
    pub fn jwk(key: JsonValue) -> Self {
        Jose {
            typ: None,
            cty: None,
            value: JoseValue::Jwk { key },
        }
    }

    pub fn jwks(keys: JsonValue) -> Self {
        Jose {
            typ: None,
            cty: None,
            value: JoseValue::Jwks { keys },
        }
    }

    /// A compact-serialization JWS. The wrapper takes its `cty` from the
    /// payload when one is supplied.
    pub fn jws(
        signature: Option<Signature>,
        signatures: Option<Vec<Signature>>,
        payload: Option<Jose>,
    ) -> Self {
        let cty = payload.as_ref().and_then(|p| p.cty.clone());
        Jose {
            typ: None,
            cty,
            value: JoseValue::Jws(Jws {
                signature,
                signatures,
                payload: payload.map(Box::new),
            }),
        }
    }

    /// A JSON-serialization JWS, flattened when a single `signature` is
    /// given and general when a `signatures` array is given.
    pub fn jws_json(
        signature: Option<Signature>,
        signatures: Option<Vec<Signature>>,
        payload: Option<Jose>,
    ) -> Self {
        let mut jose = Jose::jws(signature, signatures, payload);
        if let JoseValue::Jws(jws) = std::mem::take(&mut jose.value) {
            jose.value = JoseValue::JwsJson(jws);
        }
        jose
    }

    /// A compact-serialization JWE.
    pub fn jwe(
        recipient: Option<Recipient>,
        recipients: Option<Vec<Recipient>>,
        encryption: Encryption,
        payload: Option<Jose>,
    ) -> Self {
        let cty = payload.as_ref().and_then(|p| p.cty.clone());
        Jose {
            typ: None,
            cty,
            value: JoseValue::Jwe(Jwe {
                recipient,
                recipients,
                encryption,
                payload: payload.map(Box::new),
            }),
        }
    }

    /// A JSON-serialization JWE, flattened when a single `recipient` is
    /// given and general when a `recipients` array is given.
    pub fn jwe_json(
        recipient: Option<Recipient>,
        recipients: Option<Vec<Recipient>>,
        encryption: Encryption,
        payload: Option<Jose>,
    ) -> Self {
        let mut jose = Jose::jwe(recipient, recipients, encryption, payload);
        if let JoseValue::Jwe(jwe) = std::mem::take(&mut jose.value) {
            jose.value = JoseValue::JweJson(jwe);
        }
        jose
    }

    /// A JWT claims set. Sets `cty` to `"JWT"` so that enclosing JWS/JWE
    /// wrappers advertise their payload correctly.
    pub fn jwt(claims: JsonValue) -> Self {
        Jose {
            typ: None,
            cty: Some("JWT".to_string()),
            value: JoseValue::Jwt { claims },
        }
    }

    pub fn data(typ: Option<&str>, data: Vec<u8>) -> Self {
        Jose {
            typ: typ.map(str::to_string),
            cty: None,
            value: JoseValue::Data { data },
        }
    }

    pub fn text(cty: Option<&str>, text: String) -> Self {
        Jose {
            typ: None,
            cty: cty.map(str::to_string),
            value: JoseValue::Text { text },
        }
    }

    pub fn json(cty: Option<&str>, json: JsonValue) -> Self {
        Jose {
            typ: None,
            cty: cty.map(str::to_string),
            value: JoseValue::Json { json },
        }
    }

    /// Installs a nested payload into a JWS/JWE wrapper, taking over its
    /// `cty`. A no-op for payload-less flavours.
    pub fn set_payload(&mut self, payload: Jose) {
        self.cty = payload.cty.clone();
        match &mut self.value {
            JoseValue::Jws(jws) | JoseValue::JwsJson(jws) => {
                jws.payload = Some(Box::new(payload));
            }
            JoseValue::Jwe(jwe) | JoseValue::JweJson(jwe) => {
                jwe.payload = Some(Box::new(payload));
            }
            _ => {}
        }
    }
}
