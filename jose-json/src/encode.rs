// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! JSON encoder.
//!
//! With whitespace emission enabled, the captured `pre`/`post` runs are
//! written back around every value and key, so a value decoded in
//! whitespace mode re-encodes to the original document bytes.

use crate::value::{JsonKind, JsonObject, JsonValue};

/// Encodes `value` as JSON text.
///
/// Invalid UTF-8 inside string values is replaced with U+FFFD rather than
/// failing, so encoding always succeeds.
pub fn encode(value: &JsonValue, whitespace: bool) -> String {
    let mut out = String::new();
    encode_value(&mut out, value, whitespace);
    out
}

fn encode_value(out: &mut String, value: &JsonValue, whitespace: bool) {
    if whitespace {
        if let Some(pre) = &value.pre {
            out.push_str(pre);
        }
    }
    let inner = if whitespace {
        value.inner.as_deref()
    } else {
        None
    };
    match &value.kind {
        JsonKind::Object(object) => encode_object(out, object, whitespace, inner),
        JsonKind::Array(elements) => encode_array(out, elements, whitespace, inner),
        JsonKind::String(bytes) => encode_string(out, bytes),
        JsonKind::Long(number) => out.push_str(&number.to_string()),
        JsonKind::Double(number) => out.push_str(&format!("{number:.6}")),
        JsonKind::Boolean(true) => out.push_str("true"),
        JsonKind::Boolean(false) => out.push_str("false"),
        JsonKind::Null => out.push_str("null"),
    }
    if whitespace {
        if let Some(post) = &value.post {
            out.push_str(post);
        }
    }
}

fn encode_object(out: &mut String, object: &JsonObject, whitespace: bool, inner: Option<&str>) {
    out.push('{');
    if let Some(inner) = inner {
        out.push_str(inner);
    }
    for (index, entry) in object.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        encode_value(out, &entry.key, whitespace);
        out.push(':');
        encode_value(out, &entry.value, whitespace);
    }
    out.push('}');
}

fn encode_array(out: &mut String, elements: &[JsonValue], whitespace: bool, inner: Option<&str>) {
    out.push('[');
    if let Some(inner) = inner {
        out.push_str(inner);
    }
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        encode_value(out, element, whitespace);
    }
    out.push(']');
}

fn encode_string(out: &mut String, bytes: &[u8]) {
    out.push('"');
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            0x08 => out.push_str("\\b"),
            0x0c => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x00..=0x1f => out.push_str(&format!("\\u{c:04x}")),
            0x20..=0x7f => out.push(c as char),
            _ => {
                let len = match c {
                    0xc2..=0xdf => 2,
                    0xe0..=0xef => 3,
                    0xf0..=0xf4 => 4,
                    _ => 1,
                };
                match bytes
                    .get(i..i + len)
                    .and_then(|seq| std::str::from_utf8(seq).ok())
                {
                    Some(seq) if len > 1 => {
                        out.push_str(seq);
                        i += len;
                        continue;
                    }
                    _ => out.push('\u{fffd}'),
                }
            }
        }
        i += 1;
    }
    out.push('"');
}
