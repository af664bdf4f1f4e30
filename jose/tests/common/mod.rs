// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(dead_code)]

use std::cell::RefCell;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jose::json::{JsonObject, JsonValue};
use jose::{Crypt, CryptError, Encryption, Flow, Recipient, Signature};

pub fn b64(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub fn json_object(pairs: &[(&str, JsonValue)]) -> JsonValue {
    let mut object = JsonObject::new();
    for (key, value) in pairs {
        object.set(key, Some(value.clone()));
    }
    JsonValue::object(object)
}

pub fn json_str(text: &str) -> JsonValue {
    JsonValue::string(text)
}

fn header_alg(signature: &Signature) -> Option<&str> {
    signature
        .protected_header
        .as_ref()?
        .as_object()?
        .get("alg")?
        .as_str()
}

/// A `Crypt` with no operations at all, every method left at its default.
pub struct NothingCrypt;

impl Crypt for NothingCrypt {}

/// Unsecured `alg: none` signing and verification: the signature is
/// empty, and only `alg: none` with an empty signature verifies.
pub struct NoneCrypt;

impl Crypt for NoneCrypt {
    fn sign(&self, _signing_input: &[u8], signature: &mut Signature) -> Result<(), CryptError> {
        if header_alg(signature) != Some("none") {
            return Err(CryptError::Message("algorithm not on allow list".into()));
        }
        signature.signature.clear();
        Ok(())
    }

    fn verify(
        &self,
        _signing_input: &[u8],
        signature: &Signature,
        _flow: &mut Flow,
    ) -> Result<(), CryptError> {
        if header_alg(signature) != Some("none") {
            return Err(CryptError::Message("algorithm not on allow list".into()));
        }
        if !signature.signature.is_empty() {
            return Err(CryptError::Message("unexpected signature bytes".into()));
        }
        Ok(())
    }
}

/// A verifier that replays a scripted list of accept/reject outcomes, one
/// per call, optionally stopping further processing after the first call.
pub struct ScriptedVerifier {
    outcomes: RefCell<std::vec::IntoIter<bool>>,
    pub break_after_first: bool,
}

impl ScriptedVerifier {
    pub fn new(outcomes: &[bool]) -> Self {
        ScriptedVerifier {
            outcomes: RefCell::new(outcomes.to_vec().into_iter()),
            break_after_first: false,
        }
    }
}

impl Crypt for ScriptedVerifier {
    fn verify(
        &self,
        _signing_input: &[u8],
        _signature: &Signature,
        flow: &mut Flow,
    ) -> Result<(), CryptError> {
        if self.break_after_first {
            *flow = Flow::Break;
        }
        match self.outcomes.borrow_mut().next() {
            Some(true) => Ok(()),
            _ => Err(CryptError::Message("scripted rejection".into())),
        }
    }
}

/// A decrypter that replays a scripted list of accept/reject outcomes,
/// one per call, optionally stopping further processing after the first
/// call. Successful calls return the XOR of the ciphertext.
pub struct ScriptedDecrypter {
    outcomes: RefCell<std::vec::IntoIter<bool>>,
    pub break_after_first: bool,
    pub calls: RefCell<usize>,
}

impl ScriptedDecrypter {
    pub fn new(outcomes: &[bool]) -> Self {
        ScriptedDecrypter {
            outcomes: RefCell::new(outcomes.to_vec().into_iter()),
            break_after_first: false,
            calls: RefCell::new(0),
        }
    }
}

impl Crypt for ScriptedDecrypter {
    fn decrypt(
        &self,
        _recipient: &Recipient,
        encryption: &Encryption,
        _header: &JsonValue,
        _protected64: &str,
        _aad64: &str,
        flow: &mut Flow,
    ) -> Result<Vec<u8>, CryptError> {
        *self.calls.borrow_mut() += 1;
        if self.break_after_first {
            *flow = Flow::Break;
        }
        match self.outcomes.borrow_mut().next() {
            Some(true) => Ok(xor(&encryption.ciphertext)),
            _ => Err(CryptError::Message("scripted rejection".into())),
        }
    }
}

pub fn xor(data: &[u8]) -> Vec<u8> {
    data.iter().map(|b| b ^ 0xaa).collect()
}

/// Toy symmetric "encryption" for structure tests: XOR keystream, fixed
/// key/iv/tag material, and an `enc` allow list of exactly one name.
pub struct XorCrypt {
    pub expected_enc: &'static str,
    pub with_iv: bool,
}

impl XorCrypt {
    pub fn new(expected_enc: &'static str) -> Self {
        XorCrypt {
            expected_enc,
            with_iv: true,
        }
    }
}

impl Crypt for XorCrypt {
    fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &mut Recipient,
        encryption: &mut Encryption,
    ) -> Result<(), CryptError> {
        recipient.encrypted_key = b"ekey".to_vec();
        if self.with_iv {
            encryption.iv = b"iv-bytes".to_vec();
        }
        encryption.ciphertext = xor(plaintext);
        encryption.tag = b"tag-bytes".to_vec();
        Ok(())
    }

    fn decrypt(
        &self,
        _recipient: &Recipient,
        encryption: &Encryption,
        header: &JsonValue,
        _protected64: &str,
        _aad64: &str,
        _flow: &mut Flow,
    ) -> Result<Vec<u8>, CryptError> {
        let enc = header
            .as_object()
            .and_then(|o| o.get("enc"))
            .and_then(|v| v.as_str());
        if enc != Some(self.expected_enc) {
            return Err(CryptError::Message(format!(
                "content encryption algorithm {enc:?} not on allow list"
            )));
        }
        Ok(xor(&encryption.ciphertext))
    }
}

/// Decrypts only recipients whose encrypted key is the literal `good`.
pub struct KeyedDecrypter;

impl Crypt for KeyedDecrypter {
    fn decrypt(
        &self,
        recipient: &Recipient,
        encryption: &Encryption,
        _header: &JsonValue,
        _protected64: &str,
        _aad64: &str,
        _flow: &mut Flow,
    ) -> Result<Vec<u8>, CryptError> {
        if recipient.encrypted_key == b"good" {
            Ok(xor(&encryption.ciphertext))
        } else {
            Err(CryptError::Message("no matching key".into()))
        }
    }
}
