// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod common;

use common::{b64, KeyedDecrypter, NoneCrypt, ScriptedVerifier, XorCrypt};
use jose::{decode, DecodeOptions, JoseError, JoseValue};

const LEVEL: usize = 10;

fn options() -> DecodeOptions {
    DecodeOptions::default()
}

fn general_jws(entries: usize) -> String {
    let protected = b64(br#"{"alg":"test"}"#);
    let signature = b64(b"sigbytes");
    let entry = format!(r#"{{"protected":"{protected}","signature":"{signature}"}}"#);
    let signatures = vec![entry; entries].join(",");
    format!(
        r#"{{"payload":"{}","signatures":[{signatures}]}}"#,
        b64(b"hi")
    )
}

#[test]
fn first_matching_signature_wins() {
    let doc = general_jws(2);
    let crypt = ScriptedVerifier::new(&[false, true]);
    let jose = decode(
        Some("jose+json"),
        doc.as_bytes(),
        &crypt,
        LEVEL,
        &DecodeOptions { decode_all: true },
    )
    .expect("decode");
    match &jose.value {
        JoseValue::JwsJson(jws) => {
            let signatures = jws.signatures.as_ref().expect("signatures");
            assert_eq!(signatures.len(), 2);
            assert_eq!(signatures[0].verified, Some(false));
            assert_eq!(signatures[1].verified, Some(true));
            let payload = jws.payload.as_ref().expect("payload");
            match &payload.value {
                JoseValue::Data { data } => assert_eq!(data, b"hi"),
                other => panic!("expected data payload, got {other:?}"),
            }
        }
        other => panic!("expected JSON JWS, got {other:?}"),
    }
}

#[test]
fn all_signatures_rejected_fails_the_decode() {
    let doc = general_jws(2);
    let crypt = ScriptedVerifier::new(&[false, false]);
    let err = decode(Some("jose+json"), doc.as_bytes(), &crypt, LEVEL, &options())
        .expect_err("all rejected");
    assert!(matches!(err, JoseError::Verification { .. }), "{err}");
    assert!(err.to_string().contains("no signatures matched"), "{err}");
}

#[test]
fn a_break_from_the_callback_stops_signature_processing() {
    // the second entry would verify, but the callback breaks out first
    let doc = general_jws(2);
    let mut crypt = ScriptedVerifier::new(&[false, true]);
    crypt.break_after_first = true;
    let err = decode(Some("jose+json"), doc.as_bytes(), &crypt, LEVEL, &options())
        .expect_err("stopped early");
    assert!(matches!(err, JoseError::Verification { .. }), "{err}");
}

#[test]
fn decodes_a_flattened_jws() {
    let doc = format!(
        r#"{{"payload":"{}","protected":"{}","signature":""}}"#,
        b64(b"flat payload"),
        b64(br#"{"alg":"none"}"#),
    );
    let jose = decode(Some("jose+json"), doc.as_bytes(), &NoneCrypt, LEVEL, &options())
        .expect("decode");
    match &jose.value {
        JoseValue::Data { data } => assert_eq!(data, b"flat payload"),
        other => panic!("expected data payload, got {other:?}"),
    }
}

#[test]
fn unprotected_headers_merge_into_the_jose_header() {
    // alg lives only in the unprotected header; the verifier reads the
    // protected one, so NoneCrypt would reject - use a scripted verifier
    let doc = format!(
        r#"{{"payload":"{}","protected":"{}","header":{{"kid":"k1"}},"signature":""}}"#,
        b64(b"hi"),
        b64(br#"{"alg":"none"}"#),
    );
    let crypt = ScriptedVerifier::new(&[true]);
    let jose = decode(
        Some("jose+json"),
        doc.as_bytes(),
        &crypt,
        LEVEL,
        &DecodeOptions { decode_all: true },
    )
    .expect("decode");
    match &jose.value {
        JoseValue::JwsJson(jws) => {
            let signature = jws.signature.as_ref().expect("signature");
            let kid = signature
                .header
                .as_ref()
                .and_then(|h| h.as_object())
                .and_then(|o| o.get("kid"))
                .and_then(|v| v.as_str());
            assert_eq!(kid, Some("k1"));
        }
        other => panic!("expected JSON JWS, got {other:?}"),
    }
}

#[test]
fn a_parameter_in_both_headers_is_rejected() {
    let doc = format!(
        r#"{{"payload":"{}","protected":"{}","header":{{"alg":"none"}},"signature":""}}"#,
        b64(b"hi"),
        b64(br#"{"alg":"none"}"#),
    );
    let err = decode(Some("jose+json"), doc.as_bytes(), &NoneCrypt, LEVEL, &options())
        .expect_err("duplicate parameter");
    assert!(matches!(err, JoseError::Structure { .. }), "{err}");
    assert!(err.to_string().contains("share a parameter"), "{err}");
}

#[test]
fn structural_jws_errors_are_reported() {
    let cases = [
        (
            format!(r#"{{"payload":"{}","signature":""}}"#, b64(b"hi")),
            "'protected' header is missing",
        ),
        (
            format!(r#"{{"payload":42,"protected":"x","signature":""}}"#),
            "'payload' is not a string",
        ),
        (
            format!(
                r#"{{"payload":"{}","protected":"{}"}}"#,
                b64(b"hi"),
                b64(br#"{"alg":"none"}"#)
            ),
            "'signature' header is missing",
        ),
        (
            format!(r#"{{"payload":"{}","signatures":{{}}}}"#, b64(b"hi")),
            "'signatures' is not an array",
        ),
        (
            format!(r#"{{"payload":"{}","signatures":[1]}}"#, b64(b"hi")),
            "contains a non-object",
        ),
    ];
    for (doc, expected) in cases {
        let err = decode(Some("jose+json"), doc.as_bytes(), &NoneCrypt, LEVEL, &options())
            .unwrap_err();
        assert!(err.to_string().contains(expected), "{doc}: {err}");
    }
}

#[test]
fn a_document_with_neither_payload_nor_ciphertext_is_rejected() {
    let err = decode(Some("jose+json"), br#"{"foo":1}"#, &NoneCrypt, LEVEL, &options())
        .expect_err("neither");
    assert!(
        err.to_string().contains("neither a 'payload' nor a 'ciphertext'"),
        "{err}"
    );
}

fn flattened_jwe(enc: &str) -> String {
    let protected = b64(format!(r#"{{"alg":"dir","enc":"{enc}"}}"#).as_bytes());
    format!(
        r#"{{"protected":"{protected}","encrypted_key":"{}","iv":"{}","ciphertext":"{}","tag":"{}"}}"#,
        b64(b"good"),
        b64(b"iv-bytes"),
        b64(&common::xor(b"secret payload")),
        b64(b"tag-bytes"),
    )
}

#[test]
fn decodes_a_flattened_jwe() {
    let doc = flattened_jwe("xor");
    let jose = decode(
        Some("jose+json"),
        doc.as_bytes(),
        &XorCrypt::new("xor"),
        LEVEL,
        &options(),
    )
    .expect("decode");
    match &jose.value {
        JoseValue::Data { data } => assert_eq!(data, b"secret payload"),
        other => panic!("expected data payload, got {other:?}"),
    }
}

#[test]
fn a_flattened_jwe_that_fails_to_decrypt_is_an_error() {
    let doc = flattened_jwe("aes");
    let err = decode(
        Some("jose+json"),
        doc.as_bytes(),
        &XorCrypt::new("xor"),
        LEVEL,
        &options(),
    )
    .expect_err("wrong enc");
    assert!(matches!(err, JoseError::Decryption { .. }), "{err}");
}

#[test]
fn first_decryptable_recipient_wins() {
    let protected = b64(br#"{"alg":"dir","enc":"xor"}"#);
    let doc = format!(
        r#"{{"protected":"{protected}","recipients":[{{"encrypted_key":"{}"}},{{"encrypted_key":"{}"}}],"ciphertext":"{}"}}"#,
        b64(b"bad"),
        b64(b"good"),
        b64(&common::xor(b"shared secret")),
    );
    let jose = decode(
        Some("jose+json"),
        doc.as_bytes(),
        &KeyedDecrypter,
        LEVEL,
        &DecodeOptions { decode_all: true },
    )
    .expect("decode");
    match &jose.value {
        JoseValue::JweJson(jwe) => {
            let recipients = jwe.recipients.as_ref().expect("recipients");
            assert_eq!(recipients.len(), 2);
            assert_eq!(recipients[0].decrypted, Some(false));
            assert_eq!(recipients[1].decrypted, Some(true));
            let payload = jwe.payload.as_ref().expect("payload");
            match &payload.value {
                JoseValue::Data { data } => assert_eq!(data, b"shared secret"),
                other => panic!("expected data payload, got {other:?}"),
            }
        }
        other => panic!("expected JSON JWE, got {other:?}"),
    }
}

#[test]
fn a_break_from_the_callback_stops_recipient_processing() {
    // the second recipient would decrypt, but the callback breaks first
    let protected = b64(br#"{"alg":"dir","enc":"xor"}"#);
    let doc = format!(
        r#"{{"protected":"{protected}","recipients":[{{"encrypted_key":"{}"}},{{"encrypted_key":"{}"}}],"ciphertext":"{}"}}"#,
        b64(b"bad"),
        b64(b"good"),
        b64(&common::xor(b"shared secret")),
    );
    let mut crypt = common::ScriptedDecrypter::new(&[false, true]);
    crypt.break_after_first = true;
    let err = decode(Some("jose+json"), doc.as_bytes(), &crypt, LEVEL, &options())
        .expect_err("stopped early");
    assert!(matches!(err, JoseError::Decryption { .. }), "{err}");
    assert_eq!(*crypt.calls.borrow(), 1);
}

#[test]
fn a_parameter_repeated_in_a_recipient_header_is_rejected() {
    // alg appears in both the protected and the per-recipient header
    let protected = b64(br#"{"alg":"dir","enc":"xor"}"#);
    let doc = format!(
        r#"{{"protected":"{protected}","encrypted_key":"{}","header":{{"alg":"dir"}},"ciphertext":"{}"}}"#,
        b64(b"good"),
        b64(&common::xor(b"secret")),
    );
    let err = decode(Some("jose+json"), doc.as_bytes(), &KeyedDecrypter, LEVEL, &options())
        .expect_err("duplicate parameter");
    assert!(matches!(err, JoseError::Structure { .. }), "{err}");
    assert!(err.to_string().contains("overlapping element"), "{err}");
}

#[test]
fn no_decryptable_recipient_fails_the_decode() {
    let protected = b64(br#"{"alg":"dir","enc":"xor"}"#);
    let doc = format!(
        r#"{{"protected":"{protected}","recipients":[{{"encrypted_key":"{}"}}],"ciphertext":"{}"}}"#,
        b64(b"bad"),
        b64(b"cipher"),
    );
    let err = decode(Some("jose+json"), doc.as_bytes(), &KeyedDecrypter, LEVEL, &options())
        .expect_err("no recipients");
    assert!(err.to_string().contains("no recipients matched"), "{err}");
}

#[test]
fn structural_jwe_errors_are_reported() {
    let ciphertext = b64(b"cipher");
    let protected = b64(br#"{"alg":"dir","enc":"xor"}"#);
    let cases = [
        (
            format!(r#"{{"ciphertext":"{ciphertext}"}}"#),
            "'protected' header is missing",
        ),
        (
            format!(r#"{{"ciphertext":"{ciphertext}","protected":"{protected}"}}"#),
            "No 'recipients' or 'encrypted_key' present",
        ),
        (
            format!(
                r#"{{"ciphertext":"{ciphertext}","protected":"{protected}","recipients":1}}"#
            ),
            "'recipients' is not an array",
        ),
        (
            format!(
                r#"{{"ciphertext":"{ciphertext}","protected":"{protected}","encrypted_key":"{}","iv":7}}"#,
                b64(b"good")
            ),
            "'iv' is not a string",
        ),
    ];
    for (doc, expected) in cases {
        let err = decode(
            Some("jose+json"),
            doc.as_bytes(),
            &KeyedDecrypter,
            LEVEL,
            &options(),
        )
        .unwrap_err();
        assert!(err.to_string().contains(expected), "{doc}: {err}");
    }
}
