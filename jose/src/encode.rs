// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The JOSE encode engine.
//!
//! Nested payloads are serialized innermost-first, then signed or
//! encrypted through the caller's [`Crypt`] implementation while the
//! enclosing serialization is assembled around them. A missing sign or
//! encrypt callback is not an error on this path: the corresponding
//! segments are simply emitted empty, which is how an unsecured `alg:
//! none` structure is produced.

use jose_abstractions::{
    Crypt, CryptError, Jose, JoseError, JoseValue, Jwe, Jws, Signature, JWE_AAD,
    JWE_CIPHERTEXT, JWE_EKEY, JWE_IV, JWE_RECIPIENTS, JWE_TAG, JWE_UNPROTECTED, JWSE_HEADER,
    JWSE_PROTECTED, JWS_PAYLOAD, JWS_SIGNATURE, JWS_SIGNATURES,
};
use jose_json::{JsonObject, JsonValue};
use tracing::trace;

use crate::b64;

/// Serializes a JOSE structure to its wire form.
///
/// Signing and encryption mutate the structure in place, so the signature
/// bytes and ciphertext remain available afterwards.
pub fn encode(jose: &mut Jose, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    match &mut jose.value {
        JoseValue::Jwk { .. } | JoseValue::Jwks { .. } => Ok(Vec::new()),
        JoseValue::Data { data } => Ok(data.clone()),
        JoseValue::Text { text } => Ok(text.clone().into_bytes()),
        JoseValue::Json { json } => Ok(jose_json::encode(json, true).into_bytes()),
        JoseValue::Jwt { claims } => Ok(jose_json::encode(claims, true).into_bytes()),
        JoseValue::Jws(jws) => {
            trace!("encoding compact JWS");
            encode_compact_jws(jws, crypt)
        }
        JoseValue::JwsJson(jws) => {
            trace!("encoding JSON JWS");
            encode_json_jws(jws, crypt)
        }
        JoseValue::Jwe(jwe) => {
            trace!("encoding compact JWE");
            encode_compact_jwe(jwe, crypt)
        }
        JoseValue::JweJson(jwe) => {
            trace!("encoding JSON JWE");
            encode_json_jwe(jwe, crypt)
        }
        JoseValue::None => Err(JoseError::NotImplemented),
    }
}

/// The nested payload's wire bytes; an absent payload encodes as empty.
fn encode_payload(payload: &mut Option<Box<Jose>>, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    match payload {
        Some(inner) => encode(inner, crypt),
        None => Ok(Vec::new()),
    }
}

fn protected64(signature: &Signature) -> String {
    match &signature.protected_header {
        Some(header) => b64::encode(jose_json::encode(header, true).as_bytes()),
        None => String::new(),
    }
}

/// Runs the sign callback over `signing_input`, tolerating its absence.
fn sign(
    crypt: &dyn Crypt,
    signing_input: &[u8],
    signature: &mut Signature,
) -> Result<(), JoseError> {
    match crypt.sign(signing_input, signature) {
        Ok(()) | Err(CryptError::NotProvided(_)) => Ok(()),
        Err(source) => Err(JoseError::Signing { source }),
    }
}

fn encode_compact_jws(jws: &mut Jws, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    let payload = encode_payload(&mut jws.payload, crypt)?;
    let payload64 = b64::encode(&payload);
    let protected64 = jws
        .signature
        .as_ref()
        .map(protected64)
        .unwrap_or_default();

    let mut signing_input =
        Vec::with_capacity(protected64.len() + 1 + payload64.len());
    signing_input.extend_from_slice(protected64.as_bytes());
    signing_input.push(b'.');
    signing_input.extend_from_slice(payload64.as_bytes());

    if let Some(signature) = &mut jws.signature {
        sign(crypt, &signing_input, signature)?;
    }

    let mut out = signing_input;
    out.push(b'.');
    if let Some(signature) = &jws.signature {
        if !signature.signature.is_empty() {
            out.extend_from_slice(b64::encode(&signature.signature).as_bytes());
        }
    }
    Ok(out)
}

fn encode_compact_jwe(jwe: &mut Jwe, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    let plaintext = encode_payload(&mut jwe.payload, crypt)?;

    if let Some(recipient) = &mut jwe.recipient {
        match crypt.encrypt(&plaintext, recipient, &mut jwe.encryption) {
            Ok(()) | Err(CryptError::NotProvided(_)) => {}
            Err(source) => return Err(JoseError::Encryption { source }),
        }
    }

    let mut out = Vec::new();
    if let Some(header) = &jwe.encryption.protected_header {
        out.extend_from_slice(b64::encode(jose_json::encode(header, true).as_bytes()).as_bytes());
    }
    out.push(b'.');
    let ekey = jwe
        .recipient
        .as_ref()
        .map(|r| r.encrypted_key.as_slice())
        .unwrap_or(&[]);
    out.extend_from_slice(b64::encode(ekey).as_bytes());
    out.push(b'.');
    out.extend_from_slice(b64::encode(&jwe.encryption.iv).as_bytes());
    out.push(b'.');
    out.extend_from_slice(b64::encode(&jwe.encryption.ciphertext).as_bytes());
    out.push(b'.');
    out.extend_from_slice(b64::encode(&jwe.encryption.tag).as_bytes());
    Ok(out)
}

fn encode_json_jws(jws: &mut Jws, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    let payload = encode_payload(&mut jws.payload, crypt)?;
    let payload64 = b64::encode(&payload);

    let mut root = JsonObject::new();
    root.set(JWS_PAYLOAD, Some(JsonValue::string(payload64.clone())));

    if let Some(signature) = &mut jws.signature {
        // Flattened serialization.
        let protected64 = protected64(signature);
        root.set(JWSE_PROTECTED, Some(JsonValue::string(protected64.clone())));

        let signing_input = format!("{protected64}.{payload64}");
        sign(crypt, signing_input.as_bytes(), signature)?;

        if let Some(header) = &signature.header {
            root.set(JWSE_HEADER, Some(header.clone()));
        }
        root.set(
            JWS_SIGNATURE,
            Some(JsonValue::string(b64::encode(&signature.signature))),
        );
    } else if let Some(signatures) = &mut jws.signatures {
        // General serialization.
        let mut entries = Vec::with_capacity(signatures.len());
        for signature in signatures.iter_mut() {
            let protected64 = protected64(signature);
            let signing_input = format!("{protected64}.{payload64}");
            sign(crypt, signing_input.as_bytes(), signature)?;

            let mut entry = JsonObject::new();
            entry.set(JWSE_PROTECTED, Some(JsonValue::string(protected64)));
            if let Some(header) = &signature.header {
                entry.set(JWSE_HEADER, Some(header.clone()));
            }
            entry.set(
                JWS_SIGNATURE,
                Some(JsonValue::string(b64::encode(&signature.signature))),
            );
            entries.push(JsonValue::object(entry));
        }
        root.set(JWS_SIGNATURES, Some(JsonValue::array(entries)));
    }

    Ok(jose_json::encode(&JsonValue::object(root), true).into_bytes())
}

fn encode_json_jwe(jwe: &mut Jwe, crypt: &dyn Crypt) -> Result<Vec<u8>, JoseError> {
    let mut root = JsonObject::new();
    if let Some(header) = &jwe.encryption.protected_header {
        root.set(
            JWSE_PROTECTED,
            Some(JsonValue::string(b64::encode(
                jose_json::encode(header, true).as_bytes(),
            ))),
        );
    }
    if let Some(header) = &jwe.encryption.unprotected_header {
        root.set(JWE_UNPROTECTED, Some(header.clone()));
    }

    if jwe.recipient.is_some() {
        // Flattened serialization.
        let plaintext = encode_payload(&mut jwe.payload, crypt)?;
        if let Some(recipient) = &mut jwe.recipient {
            match crypt.encrypt(&plaintext, recipient, &mut jwe.encryption) {
                Ok(()) | Err(CryptError::NotProvided(_)) => {}
                Err(source) => return Err(JoseError::Encryption { source }),
            }
            if let Some(header) = &recipient.header {
                root.set(JWSE_HEADER, Some(header.clone()));
            }
            root.set(
                JWE_EKEY,
                Some(JsonValue::string(b64::encode(&recipient.encrypted_key))),
            );
        }
    } else if jwe.recipients.is_some() {
        // General serialization. The payload is re-encoded per recipient
        // so the encrypt callback always sees the plaintext.
        let count = jwe.recipients.as_ref().map(Vec::len).unwrap_or(0);
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let plaintext = encode_payload(&mut jwe.payload, crypt)?;
            let Some(recipients) = &mut jwe.recipients else {
                break;
            };
            let recipient = &mut recipients[index];
            match crypt.encrypt(&plaintext, recipient, &mut jwe.encryption) {
                Ok(()) | Err(CryptError::NotProvided(_)) => {}
                Err(source) => return Err(JoseError::Encryption { source }),
            }
            let mut entry = JsonObject::new();
            if let Some(header) = &recipient.header {
                entry.set(JWSE_HEADER, Some(header.clone()));
            }
            entry.set(
                JWE_EKEY,
                Some(JsonValue::string(b64::encode(&recipient.encrypted_key))),
            );
            entries.push(JsonValue::object(entry));
        }
        root.set(JWE_RECIPIENTS, Some(JsonValue::array(entries)));
    }

    if !jwe.encryption.iv.is_empty() {
        root.set(
            JWE_IV,
            Some(JsonValue::string(b64::encode(&jwe.encryption.iv))),
        );
    }
    if !jwe.encryption.aad.is_empty() {
        root.set(
            JWE_AAD,
            Some(JsonValue::string(b64::encode(&jwe.encryption.aad))),
        );
    }
    if !jwe.encryption.ciphertext.is_empty() {
        root.set(
            JWE_CIPHERTEXT,
            Some(JsonValue::string(b64::encode(&jwe.encryption.ciphertext))),
        );
    }
    if !jwe.encryption.tag.is_empty() {
        root.set(
            JWE_TAG,
            Some(JsonValue::string(b64::encode(&jwe.encryption.tag))),
        );
    }

    Ok(jose_json::encode(&JsonValue::object(root), true).into_bytes())
}
