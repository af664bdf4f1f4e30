// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The JOSE decode engine.
//!
//! Dispatch follows RFC 7519 section 7.2: the declared media type selects
//! compact, JSON, JWK or JWK-set handling, and anything unrecognised
//! passes through as opaque data. Within the compact form, the presence
//! of an `enc` header parameter distinguishes JWE from JWS; within the
//! JSON form, a `payload` member means JWS and a `ciphertext` member
//! means JWE.
//!
//! Verification and decryption never happen here. The engine reconstructs
//! the exact signed or encrypted bytes and hands them to the caller's
//! [`Crypt`] implementation; a rejection by one signature or recipient is
//! recorded and the next entry is tried.

use jose_abstractions::{
    Crypt, CryptError, Encryption, Flow, Jose, JoseError, Recipient, Signature, JWE_AAD,
    JWE_CIPHERTEXT, JWE_EKEY, JWE_ENCRYPTION, JWE_IV, JWE_RECIPIENTS, JWE_TAG,
    JWE_UNPROTECTED, JWKS_KEYS, JWSE_CONTENT_TYPE, JWSE_HEADER, JWSE_PROTECTED, JWSE_TYPE,
    JWS_PAYLOAD, JWS_SIGNATURE, JWS_SIGNATURES,
};
use jose_json::JsonValue;
use tracing::{debug, trace};

use crate::b64;
use crate::options::DecodeOptions;

/// Decodes a JOSE structure.
///
/// `typ` is the declared media type of `input`, with or without the
/// `application/` prefix; `None` or an unrecognised type yields the input
/// unchanged as opaque data. `level` bounds both JSON nesting and the
/// number of nested JOSE payloads.
///
/// By default the innermost decoded payload is returned; set
/// [`DecodeOptions::decode_all`] to retain the wrapper structure with the
/// outcome of every signature and recipient.
pub fn decode(
    typ: Option<&str>,
    input: &[u8],
    crypt: &dyn Crypt,
    level: usize,
    options: &DecodeOptions,
) -> Result<Jose, JoseError> {
    trace!(?typ, len = input.len(), "decoding JOSE structure");
    if let Some(declared) = typ {
        let name = match declared.get(..12) {
            Some(prefix) if prefix.eq_ignore_ascii_case("application/") => &declared[12..],
            _ => declared,
        };
        if name.eq_ignore_ascii_case("jwt") {
            return decode_compact(Some(declared), input, crypt, level, options);
        }
        if name.eq_ignore_ascii_case("jose") {
            return decode_compact(None, input, crypt, level, options);
        }
        if name.eq_ignore_ascii_case("jose+json") {
            return decode_json(None, input, crypt, level, options);
        }
        if name.eq_ignore_ascii_case("jwk+json") {
            return decode_jwk(declared, input, level);
        }
        if name.eq_ignore_ascii_case("jwk-set+json") {
            return decode_jwks(declared, input, level);
        }
    }
    Ok(Jose::data(typ, input.to_vec()))
}

fn is_jwt(typ: &str) -> bool {
    typ.eq_ignore_ascii_case("jwt") || typ.eq_ignore_ascii_case("application/jwt")
}

fn member<'v>(value: &'v JsonValue, key: &str) -> Option<&'v JsonValue> {
    value.as_object().and_then(|object| object.get(key))
}

fn decode_jwk(typ: &str, input: &[u8], level: usize) -> Result<Jose, JoseError> {
    let (key, _) = jose_json::decode(input, level, true)
        .map_err(|e| JoseError::json("Syntax error: JWK decoding failed", e))?;
    let mut jose = Jose::jwk(key);
    jose.typ = Some(typ.to_string());
    Ok(jose)
}

fn decode_jwks(typ: &str, input: &[u8], level: usize) -> Result<Jose, JoseError> {
    let (keys, _) = jose_json::decode(input, level, true)
        .map_err(|e| JoseError::json("Syntax error: JWKS decoding failed", e))?;
    let is_key_array = keys
        .as_object()
        .and_then(|object| object.get(JWKS_KEYS))
        .map(|member| member.as_array().is_some());
    if is_key_array != Some(true) {
        return Err(JoseError::structure(
            "Syntax error: JWKS 'keys' is not an array",
        ));
    }
    let mut jose = Jose::jwks(keys);
    jose.typ = Some(typ.to_string());
    Ok(jose)
}

fn decode_jwt(input: &[u8], level: usize) -> Result<Jose, JoseError> {
    let (claims, _) = jose_json::decode(input, level, true)
        .map_err(|e| JoseError::json("Syntax error: JWT decoding failed", e))?;
    Ok(Jose::jwt(claims))
}

/// Compact serialization: dot-separated base64url segments.
fn decode_compact(
    typ: Option<&str>,
    input: &[u8],
    crypt: &dyn Crypt,
    level: usize,
    options: &DecodeOptions,
) -> Result<Jose, JoseError> {
    let dot = input.iter().position(|&c| c == b'.').ok_or_else(|| {
        JoseError::syntax("Syntax error: JOSE compact decoding failed: no dots found")
    })?;
    let ph64 = &input[..dot];
    let rest = &input[dot + 1..];

    let phs = b64::decode(ph64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JOSE header base64url decoding failed")
    })?;
    let (header, _) = jose_json::decode(&phs, level, true)
        .map_err(|e| JoseError::json("Syntax error: JOSE header decoding failed", e))?;
    let header_object = header.as_object().ok_or_else(|| {
        JoseError::structure("Syntax error: JOSE header is not a JSON object")
    })?;

    // Refine the declared type from the header: a JWT content type means
    // the payload is a nested JWT, and an explicit typ overrides.
    let cty = header_object
        .get(JWSE_CONTENT_TYPE)
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let mut typ = typ.map(str::to_string);
    if cty.as_deref().is_some_and(is_jwt) {
        typ = Some("JWT".to_string());
    }
    if let Some(t) = header_object.get(JWSE_TYPE).and_then(|v| v.as_str()) {
        typ = Some(t.to_string());
    }

    let encrypted = header_object.contains_key(JWE_ENCRYPTION);
    trace!(encrypted, "decoding compact serialization");

    let (mut jose, payload) = if encrypted {
        decode_compact_jwe(&header, ph64, rest, crypt)?
    } else {
        decode_compact_jws(input, ph64, rest, crypt, level)?
    };

    // RFC 7519 section 5.2: no cty plus a typ of JWT means the payload is
    // the claims set itself, not another wrapped JOSE structure.
    let inner = if cty.is_none() && typ.as_deref().is_some_and(is_jwt) {
        decode_jwt(&payload, level)?
    } else {
        if level == 0 {
            return Err(JoseError::NestingTooDeep);
        }
        decode(typ.as_deref(), &payload, crypt, level - 1, options)?
    };

    if options.decode_all {
        jose.set_payload(inner);
        Ok(jose)
    } else {
        Ok(inner)
    }
}

fn decode_compact_jws(
    input: &[u8],
    ph64: &[u8],
    rest: &[u8],
    crypt: &dyn Crypt,
    level: usize,
) -> Result<(Jose, Vec<u8>), JoseError> {
    let dot = rest.iter().position(|&c| c == b'.').ok_or_else(|| {
        JoseError::syntax("Syntax error: JWS compact decoding failed: one lonely dot")
    })?;
    let pl64 = &rest[..dot];
    let sig64 = &rest[dot + 1..];

    // The signing input is a slice of the wire bytes, never re-encoded.
    let signing_input = &input[..ph64.len() + 1 + pl64.len()];

    let mut flow = Flow::Continue;
    let signature = decode_jws_signature(ph64, sig64, None, signing_input, crypt, level, &mut flow)?;
    if signature.verified != Some(true) {
        return Err(JoseError::verification(
            "JWS verification failed: signature rejected",
        ));
    }

    let payload = b64::decode(pl64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWS 'payload' is not valid base64url")
    })?;

    Ok((Jose::jws(Some(signature), None, None), payload))
}

/// Decodes and verifies one JWS signature entry. Structural problems are
/// errors; a rejection by the verify callback is recorded in
/// `Signature::verified` so the caller can try further entries.
fn decode_jws_signature(
    ph64: &[u8],
    sig64: &[u8],
    unprotected: Option<&JsonValue>,
    signing_input: &[u8],
    crypt: &dyn Crypt,
    level: usize,
    flow: &mut Flow,
) -> Result<Signature, JoseError> {
    let phs = b64::decode(ph64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWS 'protected' is not valid base64url")
    })?;
    let (protected, _) = jose_json::decode(&phs, level, true)
        .map_err(|e| JoseError::json("Syntax error: JWS 'protected' decoding failed", e))?;
    if protected.as_object().is_none() {
        return Err(JoseError::structure(
            "Syntax error: JWS 'protected' is not a JSON object",
        ));
    }

    // The JOSE header is the disjoint union of the protected and
    // unprotected headers.
    if unprotected.is_some()
        && jose_json::overlay(Some(&protected), unprotected, true).is_none()
    {
        return Err(JoseError::structure(
            "Syntax error: JWS protected and unprotected headers share a parameter",
        ));
    }

    let sig = b64::decode(sig64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWS signature decoding failed: bad character")
    })?;

    let mut signature = Signature {
        header: unprotected.cloned(),
        protected_header: Some(protected),
        signature: sig,
        verified: None,
    };
    match crypt.verify(signing_input, &signature, flow) {
        Ok(()) => signature.verified = Some(true),
        Err(CryptError::NotProvided(_)) => {
            return Err(JoseError::no_callback("Verification", "verify"));
        }
        Err(e) => {
            debug!(error = %e, "signature rejected by verify callback");
            signature.verified = Some(false);
        }
    }
    Ok(signature)
}

fn decode_compact_jwe(
    header: &JsonValue,
    ph64: &[u8],
    rest: &[u8],
    crypt: &dyn Crypt,
) -> Result<(Jose, Vec<u8>), JoseError> {
    let dot = rest.iter().position(|&c| c == b'.').ok_or_else(|| {
        JoseError::syntax("Syntax error: compact JWE decoding failed: one lonely dot")
    })?;
    let ekey64 = &rest[..dot];
    let rest = &rest[dot + 1..];

    let dot = rest.iter().position(|&c| c == b'.').ok_or_else(|| {
        JoseError::syntax("Syntax error: JWE compact decoding failed: only two dots")
    })?;
    let iv64 = &rest[..dot];
    let rest = &rest[dot + 1..];

    let dot = rest.iter().position(|&c| c == b'.').ok_or_else(|| {
        JoseError::syntax("Syntax error: JOSE compact JWE decoding failed: only three dots")
    })?;
    let cipher64 = &rest[..dot];
    let tag64 = &rest[dot + 1..];

    let encrypted_key = b64::decode(ekey64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWE ekey base64url decoding failed")
    })?;
    let iv = b64::decode(iv64)
        .ok_or_else(|| JoseError::syntax("Syntax error: JWE iv base64url decoding failed"))?;
    let ciphertext = b64::decode(cipher64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWE ciphertext base64url decoding failed")
    })?;
    let tag = b64::decode(tag64)
        .ok_or_else(|| JoseError::syntax("Syntax error: JWE tag base64url decoding failed"))?;

    let mut recipient = Recipient {
        header: None,
        encrypted_key,
        decrypted: None,
    };
    let encryption = Encryption {
        protected_header: Some(header.clone()),
        protected64: Some(String::from_utf8_lossy(ph64).into_owned()),
        unprotected_header: None,
        aad: Vec::new(),
        aad64: None,
        iv,
        ciphertext,
        tag,
    };

    let mut flow = Flow::Continue;
    let plain = decode_jwe_recipient(&mut recipient, &encryption, crypt, &mut flow)?;
    let Some(payload) = plain else {
        return Err(JoseError::decryption(
            "Decryption failed: JWE decryption failed",
        ));
    };

    Ok((Jose::jwe(Some(recipient), None, encryption, None), payload))
}

/// Decrypts one JWE recipient entry. A rejection by the decrypt callback
/// is recorded in `Recipient::decrypted` and reported as `None` so the
/// caller can try further entries.
fn decode_jwe_recipient(
    recipient: &mut Recipient,
    encryption: &Encryption,
    crypt: &dyn Crypt,
    flow: &mut Flow,
) -> Result<Option<Vec<u8>>, JoseError> {
    // Disjoint union of the protected, shared unprotected and
    // per-recipient headers. A parameter in more than one, or no headers
    // at all, fails the entry outright.
    let merged = jose_json::overlay(
        encryption.protected_header.as_ref(),
        encryption.unprotected_header.as_ref(),
        true,
    )
    .and_then(|shared| jose_json::overlay(recipient.header.as_ref(), Some(&shared), true));
    let Some(header) = merged else {
        return Err(JoseError::structure(
            "JWE decryption failed: protected, unprotected and per recipient headers had an \
             overlapping element, or were all missing",
        ));
    };

    let protected64 = encryption.protected64.as_deref().unwrap_or("");
    let aad64 = encryption.aad64.as_deref().unwrap_or("");
    match crypt.decrypt(&*recipient, encryption, &header, protected64, aad64, flow) {
        Ok(plain) => {
            recipient.decrypted = Some(true);
            Ok(Some(plain))
        }
        Err(CryptError::NotProvided(_)) => Err(JoseError::no_callback("Decryption", "decrypt")),
        Err(e) => {
            debug!(error = %e, "recipient rejected by decrypt callback");
            recipient.decrypted = Some(false);
            Ok(None)
        }
    }
}

/// JSON serialization: a `payload` member means JWS, a `ciphertext`
/// member means JWE.
fn decode_json(
    typ: Option<&str>,
    input: &[u8],
    crypt: &dyn Crypt,
    level: usize,
    options: &DecodeOptions,
) -> Result<Jose, JoseError> {
    let (doc, _) = jose_json::decode(input, level, true)
        .map_err(|e| JoseError::json("Syntax error: JOSE JSON decoding failed", e))?;

    if member(&doc, JWS_PAYLOAD).is_some() {
        trace!("decoding JSON serialization as JWS");
        return decode_json_jws(&doc, typ, crypt, level, options);
    }
    if member(&doc, JWE_CIPHERTEXT).is_some() {
        trace!("decoding JSON serialization as JWE");
        return decode_json_jwe(&doc, typ, crypt, level, options);
    }
    Err(JoseError::structure(
        "Syntax error: JOSE JSON contained neither a 'payload' nor a 'ciphertext'",
    ))
}

/// The `protected`, optional `header` and `signature` members shared by
/// the flattened form and each entry of the general `signatures` array.
fn jws_members(value: &JsonValue) -> Result<(&[u8], Option<&JsonValue>, &[u8]), JoseError> {
    let protected = member(value, JWSE_PROTECTED).ok_or_else(|| {
        JoseError::structure("Syntax error: JWS 'protected' header is missing")
    })?;
    let ph64 = protected.as_string_bytes().ok_or_else(|| {
        JoseError::structure("Syntax error: JWS 'protected' is not a string")
    })?;

    let unprotected = match member(value, JWSE_HEADER) {
        None => None,
        Some(header) => {
            if header.as_object().is_none() {
                return Err(JoseError::structure(
                    "Syntax error: JWS 'header' is not an object",
                ));
            }
            Some(header)
        }
    };

    let signature = member(value, JWS_SIGNATURE).ok_or_else(|| {
        JoseError::structure("Syntax error: JWS 'signature' header is missing")
    })?;
    let sig64 = signature.as_string_bytes().ok_or_else(|| {
        JoseError::structure("Syntax error: JWS 'signature' is not a string")
    })?;

    Ok((ph64, unprotected, sig64))
}

fn decode_json_jws(
    doc: &JsonValue,
    typ: Option<&str>,
    crypt: &dyn Crypt,
    level: usize,
    options: &DecodeOptions,
) -> Result<Jose, JoseError> {
    let pl64 = match member(doc, JWS_PAYLOAD) {
        Some(payload) => payload.as_string_bytes().ok_or_else(|| {
            JoseError::structure("Syntax error: JWS 'payload' is not a string")
        })?,
        None => &[],
    };
    let payload = b64::decode(pl64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWS 'payload' is not valid base64url")
    })?;

    if let Some(entries) = member(doc, JWS_SIGNATURES) {
        // General serialization: evaluate every entry, first success
        // drives the payload decode.
        let entries = entries.as_array().ok_or_else(|| {
            JoseError::structure("Syntax error: JWS 'signatures' is not an array")
        })?;
        let mut signatures = Vec::with_capacity(entries.len());
        let mut inner: Option<Jose> = None;
        let mut verified = 0usize;
        let mut flow = Flow::Continue;
        for entry in entries {
            if entry.as_object().is_none() {
                return Err(JoseError::structure(
                    "Syntax error: JWS 'signatures' array contains a non-object",
                ));
            }
            let (ph64, unprotected, sig64) = jws_members(entry)?;
            // RFC 7515 section 5.2: the signing input is rebuilt from the
            // wire base64url texts of this entry and the shared payload.
            let signing_input = [ph64, &b"."[..], pl64].concat();
            let signature = decode_jws_signature(
                ph64,
                sig64,
                unprotected,
                &signing_input,
                crypt,
                level,
                &mut flow,
            )?;
            let accepted = signature.verified == Some(true);
            signatures.push(signature);
            if accepted {
                verified += 1;
                if verified == 1 {
                    if level == 0 {
                        return Err(JoseError::NestingTooDeep);
                    }
                    inner = Some(decode(typ, &payload, crypt, level - 1, options)?);
                }
            }
            if flow == Flow::Break {
                debug!("verify callback stopped signature processing");
                break;
            }
        }
        if verified == 0 {
            return Err(JoseError::verification(
                "JWS verification failed: no signatures matched",
            ));
        }
        let mut jose = Jose::jws_json(None, Some(signatures), None);
        if options.decode_all {
            if let Some(inner) = inner {
                jose.set_payload(inner);
            }
            Ok(jose)
        } else {
            inner.ok_or_else(|| {
                JoseError::verification("JWS verification failed: no signatures matched")
            })
        }
    } else {
        // Flattened serialization: a single signature at top level.
        let (ph64, unprotected, sig64) = jws_members(doc)?;
        let signing_input = [ph64, &b"."[..], pl64].concat();
        let mut flow = Flow::Continue;
        let signature = decode_jws_signature(
            ph64,
            sig64,
            unprotected,
            &signing_input,
            crypt,
            level,
            &mut flow,
        )?;
        if signature.verified != Some(true) {
            return Err(JoseError::verification(
                "JWS verification failed: signature rejected",
            ));
        }
        if level == 0 {
            return Err(JoseError::NestingTooDeep);
        }
        let inner = decode(typ, &payload, crypt, level - 1, options)?;
        let mut jose = Jose::jws_json(Some(signature), None, None);
        if options.decode_all {
            jose.set_payload(inner);
            Ok(jose)
        } else {
            Ok(inner)
        }
    }
}

/// The optional `header` and `encrypted_key` members shared by the
/// flattened form and each entry of the general `recipients` array.
fn jwe_recipient_members(value: &JsonValue) -> Result<Recipient, JoseError> {
    let header = match member(value, JWSE_HEADER) {
        None => None,
        Some(header) => {
            if header.as_object().is_none() {
                return Err(JoseError::structure(
                    "Syntax error: JWE 'header' is not an object",
                ));
            }
            Some(header.clone())
        }
    };
    let encrypted_key = match member(value, JWE_EKEY) {
        None => Vec::new(),
        Some(key) => {
            let key64 = key.as_string_bytes().ok_or_else(|| {
                JoseError::structure("Syntax error: JWE 'encrypted_key' element must be a string")
            })?;
            b64::decode(key64).ok_or_else(|| {
                JoseError::syntax("Syntax error: JWE 'encrypted_key' is not valid base64url")
            })?
        }
    };
    Ok(Recipient {
        header,
        encrypted_key,
        decrypted: None,
    })
}

/// An optional base64url string member, decoded.
fn optional_b64_member(
    doc: &JsonValue,
    key: &str,
    not_string: &str,
    not_b64: &str,
) -> Result<Vec<u8>, JoseError> {
    match member(doc, key) {
        None => Ok(Vec::new()),
        Some(value) => {
            let text = value
                .as_string_bytes()
                .ok_or_else(|| JoseError::structure(not_string.to_string()))?;
            b64::decode(text).ok_or_else(|| JoseError::syntax(not_b64.to_string()))
        }
    }
}

fn decode_json_jwe(
    doc: &JsonValue,
    typ: Option<&str>,
    crypt: &dyn Crypt,
    level: usize,
    options: &DecodeOptions,
) -> Result<Jose, JoseError> {
    let ct64 = match member(doc, JWE_CIPHERTEXT) {
        Some(ciphertext) => ciphertext.as_string_bytes().ok_or_else(|| {
            JoseError::structure("Syntax error: JWE 'ciphertext' is not a string")
        })?,
        None => &[],
    };
    let ciphertext = b64::decode(ct64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWE 'ciphertext' is not valid base64url")
    })?;

    let protected = member(doc, JWSE_PROTECTED).ok_or_else(|| {
        JoseError::structure("Syntax error: JWE 'protected' header is missing")
    })?;
    let ph64 = protected.as_string_bytes().ok_or_else(|| {
        JoseError::structure("Syntax error: JWE 'protected' is not a string")
    })?;
    let phs = b64::decode(ph64).ok_or_else(|| {
        JoseError::syntax("Syntax error: JWE 'protected' is not valid base64url")
    })?;
    let (protected, _) = jose_json::decode(&phs, level, true)
        .map_err(|e| JoseError::json("Syntax error: JWE 'protected' decoding failed", e))?;
    if protected.as_object().is_none() {
        return Err(JoseError::structure(
            "Syntax error: JWE 'protected' is not a JSON object",
        ));
    }

    let unprotected = match member(doc, JWE_UNPROTECTED) {
        None => None,
        Some(unprotected) => {
            if unprotected.as_object().is_none() {
                return Err(JoseError::structure(
                    "Syntax error: JWE 'unprotected' is not an object",
                ));
            }
            Some(unprotected.clone())
        }
    };

    let iv = optional_b64_member(
        doc,
        JWE_IV,
        "Syntax error: JWE 'iv' is not a string",
        "Syntax error: JWE 'iv' is not valid base64url",
    )?;
    let tag = optional_b64_member(
        doc,
        JWE_TAG,
        "Syntax error: JWE 'tag' is not a string",
        "Syntax error: JWE 'tag' is not valid base64url",
    )?;
    let (aad, aad64) = match member(doc, JWE_AAD) {
        None => (Vec::new(), None),
        Some(value) => {
            let text = value.as_string_bytes().ok_or_else(|| {
                JoseError::structure("Syntax error: JWE 'aad' is not a string")
            })?;
            let aad = b64::decode(text).ok_or_else(|| {
                JoseError::syntax("Syntax error: JWE 'aad' is not valid base64url")
            })?;
            (aad, Some(String::from_utf8_lossy(text).into_owned()))
        }
    };

    let encryption = Encryption {
        protected_header: Some(protected),
        protected64: Some(String::from_utf8_lossy(ph64).into_owned()),
        unprotected_header: unprotected,
        aad,
        aad64,
        iv,
        ciphertext,
        tag,
    };

    if let Some(entries) = member(doc, JWE_RECIPIENTS) {
        // General serialization: try every recipient, first success
        // drives the payload decode.
        let entries = entries.as_array().ok_or_else(|| {
            JoseError::structure("Syntax error: JWE 'recipients' is not an array")
        })?;
        let mut recipients = Vec::with_capacity(entries.len());
        let mut inner: Option<Jose> = None;
        let mut decrypted = 0usize;
        let mut flow = Flow::Continue;
        for entry in entries {
            if entry.as_object().is_none() {
                return Err(JoseError::structure(
                    "Syntax error: JWE 'recipients' array contains a non-object",
                ));
            }
            let mut recipient = jwe_recipient_members(entry)?;
            let plain = decode_jwe_recipient(&mut recipient, &encryption, crypt, &mut flow)?;
            recipients.push(recipient);
            if let Some(plain) = plain {
                decrypted += 1;
                if decrypted == 1 {
                    if level == 0 {
                        return Err(JoseError::NestingTooDeep);
                    }
                    inner = Some(decode(typ, &plain, crypt, level - 1, options)?);
                }
            }
            if flow == Flow::Break {
                debug!("decrypt callback stopped recipient processing");
                break;
            }
        }
        if decrypted == 0 {
            return Err(JoseError::decryption(
                "JWE decryption failed: no recipients matched",
            ));
        }
        let mut jose = Jose::jwe_json(None, Some(recipients), encryption, None);
        if options.decode_all {
            if let Some(inner) = inner {
                jose.set_payload(inner);
            }
            Ok(jose)
        } else {
            inner.ok_or_else(|| {
                JoseError::decryption("JWE decryption failed: no recipients matched")
            })
        }
    } else {
        // Flattened serialization: a single recipient at top level.
        if member(doc, JWE_EKEY).is_none() {
            return Err(JoseError::structure(
                "Syntax error: No 'recipients' or 'encrypted_key' present",
            ));
        }
        let mut recipient = jwe_recipient_members(doc)?;
        let mut flow = Flow::Continue;
        let plain = decode_jwe_recipient(&mut recipient, &encryption, crypt, &mut flow)?;
        let Some(plain) = plain else {
            return Err(JoseError::decryption(
                "Decryption failed: JWE decryption failed",
            ));
        };
        if level == 0 {
            return Err(JoseError::NestingTooDeep);
        }
        let inner = decode(typ, &plain, crypt, level - 1, options)?;
        let mut jose = Jose::jwe_json(Some(recipient), None, encryption, None);
        if options.decode_all {
            jose.set_payload(inner);
            Ok(jose)
        } else {
            Ok(inner)
        }
    }
}
