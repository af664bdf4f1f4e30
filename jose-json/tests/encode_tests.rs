// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use jose_json::{decode, encode, JsonObject, JsonValue};

fn object(pairs: &[(&str, JsonValue)]) -> JsonValue {
    let mut object = JsonObject::new();
    for (key, value) in pairs {
        object.set(key, Some(value.clone()));
    }
    JsonValue::object(object)
}

#[test]
fn encodes_scalars() {
    assert_eq!(encode(&JsonValue::null(), false), "null");
    assert_eq!(encode(&JsonValue::boolean(true), false), "true");
    assert_eq!(encode(&JsonValue::long(-42), false), "-42");
    assert_eq!(encode(&JsonValue::string("hi"), false), "\"hi\"");
}

#[test]
fn encodes_doubles_with_fixed_precision() {
    assert_eq!(encode(&JsonValue::double(0.5), false), "0.500000");
    assert_eq!(encode(&JsonValue::double(-1.25), false), "-1.250000");
}

#[test]
fn encodes_objects_in_insertion_order() {
    let value = object(&[
        ("z", JsonValue::long(1)),
        ("a", JsonValue::array(vec![JsonValue::long(2), JsonValue::null()])),
    ]);
    assert_eq!(encode(&value, false), r#"{"z":1,"a":[2,null]}"#);
}

#[test]
fn escapes_control_and_quote_characters() {
    let value = JsonValue::string("a\"b\\c\nd\x01e");
    assert_eq!(encode(&value, false), r#""a\"b\\c\nde""#);
}

#[test]
fn passes_valid_multibyte_utf8_through() {
    let value = JsonValue::string("caf\u{e9} \u{1f600}");
    assert_eq!(encode(&value, false), "\"caf\u{e9} \u{1f600}\"");
}

#[test]
fn replaces_invalid_utf8_with_replacement_character() {
    let value = JsonValue::string(vec![b'a', 0xff, b'b']);
    assert_eq!(encode(&value, false), "\"a\u{fffd}b\"");

    // truncated lead byte at end of string
    let value = JsonValue::string(vec![b'a', 0xe2]);
    assert_eq!(encode(&value, false), "\"a\u{fffd}\"");
}

#[test]
fn encode_then_decode_is_identity() {
    let value = object(&[
        ("n", JsonValue::long(7)),
        ("s", JsonValue::string("x\ny")),
        ("l", JsonValue::array(vec![JsonValue::boolean(false)])),
        ("o", object(&[("inner", JsonValue::null())])),
    ]);
    let text = encode(&value, false);
    let (back, _) = decode(text.as_bytes(), 10, false).expect("decode");
    assert_eq!(back, value);
}
