// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The JSON value model.
//!
//! Values carry the whitespace that surrounded them on the wire (when the
//! decoder is asked to keep it), which lets a decode/encode round trip
//! reproduce the original bytes. Object members keep their insertion order
//! for the same reason; lookup is a linear scan, which is the right trade
//! for the handful of members a JOSE header carries.
//!
//! String values are byte strings. They are valid UTF-8 when produced by
//! the decoder, but constructed values may hold arbitrary bytes; the
//! encoder substitutes U+FFFD for anything it cannot represent.

/// A JSON value together with any captured surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonValue {
    /// Whitespace that preceded the value, if the decoder kept it.
    pub pre: Option<String>,
    /// Whitespace that followed the value, if the decoder kept it.
    pub post: Option<String>,
    /// Whitespace between the brackets of an empty object or array, if
    /// the decoder kept it. Always `None` for non-empty containers: the
    /// interior runs of those belong to their members.
    pub inner: Option<String>,
    pub kind: JsonKind,
}

/// The seven JSON value kinds, with numbers split into integer and
/// floating point variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonKind {
    Object(JsonObject),
    Array(Vec<JsonValue>),
    String(Vec<u8>),
    Long(i64),
    Double(f64),
    Boolean(bool),
    #[default]
    Null,
}

impl JsonValue {
    pub fn object(object: JsonObject) -> Self {
        JsonKind::Object(object).into()
    }

    pub fn array(elements: Vec<JsonValue>) -> Self {
        JsonKind::Array(elements).into()
    }

    pub fn string(text: impl Into<Vec<u8>>) -> Self {
        JsonKind::String(text.into()).into()
    }

    pub fn long(number: i64) -> Self {
        JsonKind::Long(number).into()
    }

    pub fn double(number: f64) -> Self {
        JsonKind::Double(number).into()
    }

    pub fn boolean(value: bool) -> Self {
        JsonKind::Boolean(value).into()
    }

    pub fn null() -> Self {
        JsonKind::Null.into()
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match &self.kind {
            JsonKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut JsonObject> {
        match &mut self.kind {
            JsonKind::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match &self.kind {
            JsonKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<JsonValue>> {
        match &mut self.kind {
            JsonKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// The raw bytes of a string value.
    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            JsonKind::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// A string value as `&str`, when its bytes are valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_string_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn as_long(&self) -> Option<i64> {
        match &self.kind {
            JsonKind::Long(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match &self.kind {
            JsonKind::Double(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match &self.kind {
            JsonKind::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, JsonKind::Null)
    }
}

impl From<JsonKind> for JsonValue {
    fn from(kind: JsonKind) -> Self {
        JsonValue {
            pre: None,
            post: None,
            inner: None,
            kind,
        }
    }
}

/// One `key: value` member of a JSON object. The key is itself a
/// [`JsonValue`] so it can carry its own surrounding whitespace.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonEntry {
    pub key: JsonValue,
    pub value: JsonValue,
}

impl JsonEntry {
    /// The raw bytes of the member key, empty if the key is somehow not
    /// a string.
    pub fn key_bytes(&self) -> &[u8] {
        self.key.as_string_bytes().unwrap_or(&[])
    }

    pub fn key_str(&self) -> Option<&str> {
        self.key.as_str()
    }
}

/// An insertion-ordered JSON object.
///
/// Setting an existing key overwrites in place, so the member keeps its
/// original position within the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JsonObject {
    entries: Vec<JsonEntry>,
}

impl JsonObject {
    pub fn new() -> Self {
        JsonObject::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.get_raw(key.as_bytes())
    }

    pub fn get_raw(&self, key: &[u8]) -> Option<&JsonValue> {
        self.entries
            .iter()
            .find(|entry| entry.key_bytes() == key)
            .map(|entry| &entry.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        self.entries
            .iter_mut()
            .find(|entry| entry.key_bytes() == key.as_bytes())
            .map(|entry| &mut entry.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets or deletes a member. `None` removes the member if present;
    /// `Some` overwrites an existing member in place or appends a new one.
    pub fn set(&mut self, key: &str, value: Option<JsonValue>) {
        match value {
            None => {
                self.remove(key);
            }
            Some(value) => {
                match self
                    .entries
                    .iter_mut()
                    .find(|entry| entry.key_bytes() == key.as_bytes())
                {
                    Some(entry) => entry.value = value,
                    None => self.entries.push(JsonEntry {
                        key: JsonValue::string(key),
                        value,
                    }),
                }
            }
        }
    }

    /// Sets a member using a key value that may carry whitespace. A
    /// duplicate key replaces both the stored key and value, keeping the
    /// original position.
    pub fn set_entry(&mut self, key: JsonValue, value: JsonValue) {
        let key_bytes = key.as_string_bytes().unwrap_or(&[]);
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.key_bytes() == key_bytes)
        {
            Some(entry) => {
                entry.key = key;
                entry.value = value;
            }
            None => self.entries.push(JsonEntry { key, value }),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.key_bytes() == key.as_bytes())?;
        Some(self.entries.remove(index).value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JsonEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a JsonObject {
    type Item = &'a JsonEntry;
    type IntoIter = std::slice::Iter<'a, JsonEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Overlays one JSON value over another.
///
/// When both values are non-empty objects the result is a new object
/// holding the members of `base` that `overlay` does not name, followed by
/// every member of `overlay`. With `strict` set, any key present in both
/// objects makes the overlay fail and the function returns `None`.
///
/// When either side is missing or not an object, `overlay` wins where
/// present and `base` is returned otherwise.
pub fn overlay(
    overlay: Option<&JsonValue>,
    base: Option<&JsonValue>,
    strict: bool,
) -> Option<JsonValue> {
    let base_object = match base {
        Some(value) => match &value.kind {
            JsonKind::Object(object) => object,
            _ => return overlay.cloned(),
        },
        None => return overlay.cloned(),
    };
    let over = match overlay {
        Some(value) => value,
        None => return base.cloned(),
    };
    let over_object = match &over.kind {
        JsonKind::Object(object) => object,
        _ => return Some(over.clone()),
    };

    if over_object.is_empty() {
        return base.cloned();
    }
    if base_object.is_empty() {
        return Some(over.clone());
    }

    let mut merged = JsonObject::new();
    for entry in base_object {
        if over_object.get_raw(entry.key_bytes()).is_none() {
            merged.set_entry(entry.key.clone(), entry.value.clone());
        } else if strict {
            return None;
        }
    }
    for entry in over_object {
        merged.set_entry(entry.key.clone(), entry.value.clone());
    }
    Some(JsonValue::object(merged))
}
