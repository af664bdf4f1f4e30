// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Recursive-descent JSON decoder over raw bytes.
//!
//! The decoder is RFC 8259 conformant, with a caller-supplied nesting
//! budget instead of an unbounded stack, and an optional whitespace
//! capture mode that records the exact inter-token whitespace so the
//! encoder can reproduce the input byte for byte.

use crate::error::{JsonError, JsonErrorKind};
use crate::value::{JsonKind, JsonObject, JsonValue};

/// Decodes a single JSON value from `input`.
///
/// `level` bounds how deeply arrays and objects may nest; each container
/// consumes one level, and an input needing more than `level` containers
/// on the path to any leaf fails with [`JsonErrorKind::NestingTooDeep`].
///
/// With `whitespace` set, the whitespace around every value and object key
/// is recorded in the value's `pre`/`post` fields.
///
/// Anything other than trailing whitespace after the value is an error, so
/// on success the returned byte count equals `input.len()`.
pub fn decode(
    input: &[u8],
    level: usize,
    whitespace: bool,
) -> Result<(JsonValue, usize), JsonError> {
    let mut scanner = Scanner {
        input,
        pos: 0,
        level,
        whitespace,
    };
    let value = scanner.decode_value()?;
    if scanner.pos != scanner.input.len() {
        return Err(scanner.err(JsonErrorKind::BadChar));
    }
    Ok((value, scanner.pos))
}

struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    level: usize,
    whitespace: bool,
}

impl Scanner<'_> {
    fn err(&self, kind: JsonErrorKind) -> JsonError {
        JsonError {
            kind,
            offset: self.pos,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// The next byte after any run of whitespace, without consuming.
    fn peek_nonspace(&self) -> Option<u8> {
        self.input[self.pos..]
            .iter()
            .copied()
            .find(|c| !c.is_ascii_whitespace())
    }

    /// Consumes a run of whitespace, returning it when capture is on.
    fn decode_space(&mut self) -> Option<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if self.whitespace && self.pos > start {
            // whitespace is ASCII, the lossy conversion never replaces
            Some(String::from_utf8_lossy(&self.input[start..self.pos]).into_owned())
        } else {
            None
        }
    }

    fn decode_value(&mut self) -> Result<JsonValue, JsonError> {
        let pre = self.decode_space();
        let mut inner = None;
        let kind = match self.peek() {
            None => return Err(self.err(JsonErrorKind::Eof)),
            Some(b'"') => JsonKind::String(self.decode_string()?),
            Some(b'{') => {
                let (object, ws) = self.decode_object()?;
                inner = ws;
                JsonKind::Object(object)
            }
            Some(b'[') => {
                let (elements, ws) = self.decode_array()?;
                inner = ws;
                JsonKind::Array(elements)
            }
            Some(b'n') => {
                self.decode_literal(b"null")?;
                JsonKind::Null
            }
            Some(b't') => {
                self.decode_literal(b"true")?;
                JsonKind::Boolean(true)
            }
            Some(b'f') => {
                self.decode_literal(b"false")?;
                JsonKind::Boolean(false)
            }
            Some(b'-') | Some(b'0'..=b'9') => self.decode_number()?,
            Some(_) => return Err(self.err(JsonErrorKind::BadChar)),
        };
        let post = self.decode_space();
        Ok(JsonValue {
            pre,
            post,
            inner,
            kind,
        })
    }

    fn decode_literal(&mut self, literal: &[u8]) -> Result<(), JsonError> {
        if self.input[self.pos..].starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.err(JsonErrorKind::BadChar))
        }
    }

    fn decode_number(&mut self) -> Result<JsonKind, JsonError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.decode_digits()?;

        let mut float = false;
        if self.peek() == Some(b'.') {
            float = true;
            self.pos += 1;
            self.decode_digits()?;
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            self.decode_digits()?;
        }

        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.err(JsonErrorKind::BadChar))?;
        if float {
            return text
                .parse::<f64>()
                .map(JsonKind::Double)
                .map_err(|_| self.err(JsonErrorKind::BadChar));
        }
        match text.parse::<i64>() {
            Ok(number) => Ok(JsonKind::Long(number)),
            // integer wider than i64, keep the value as a double
            Err(_) => text
                .parse::<f64>()
                .map(JsonKind::Double)
                .map_err(|_| self.err(JsonErrorKind::BadChar)),
        }
    }

    /// At least one decimal digit.
    fn decode_digits(&mut self) -> Result<(), JsonError> {
        match self.peek() {
            None => return Err(self.err(JsonErrorKind::Eof)),
            Some(b'0'..=b'9') => {}
            Some(_) => return Err(self.err(JsonErrorKind::BadChar)),
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        Ok(())
    }

    fn decode_string(&mut self) -> Result<Vec<u8>, JsonError> {
        self.pos += 1; // opening quote
        let mut out = Vec::new();
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.err(JsonErrorKind::Eof)),
            };
            match c {
                b'"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    self.pos += 1;
                    self.decode_escape(&mut out)?;
                }
                0x00..=0x7f => {
                    out.push(c);
                    self.pos += 1;
                }
                _ => self.decode_raw_utf8(&mut out)?,
            }
        }
    }

    fn decode_escape(&mut self, out: &mut Vec<u8>) -> Result<(), JsonError> {
        let c = match self.peek() {
            Some(c) => c,
            None => return Err(self.err(JsonErrorKind::Eof)),
        };
        self.pos += 1;
        match c {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let mut cp = self.decode_hex4()?;
                if (0xd800..0xdc00).contains(&cp) {
                    // high surrogate, a \uXXXX low surrogate must follow
                    if self.input.len() - self.pos < 6 {
                        return Err(self.err(JsonErrorKind::Eof));
                    }
                    if self.input[self.pos] != b'\\' || self.input[self.pos + 1] != b'u' {
                        return Err(self.err(JsonErrorKind::BadChar));
                    }
                    self.pos += 2;
                    let low = self.decode_hex4()?;
                    if !(0xdc00..0xe000).contains(&low) {
                        return Err(self.err(JsonErrorKind::BadChar));
                    }
                    cp = 0x10000 + (((cp - 0xd800) << 10) | (low - 0xdc00));
                } else if (0xdc00..0xe000).contains(&cp) {
                    // lone low surrogate
                    return Err(self.err(JsonErrorKind::BadChar));
                }
                match char::from_u32(cp) {
                    Some(ch) => {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                    None => return Err(self.err(JsonErrorKind::BadChar)),
                }
            }
            _ => return Err(self.err(JsonErrorKind::BadChar)),
        }
        Ok(())
    }

    fn decode_hex4(&mut self) -> Result<u32, JsonError> {
        if self.input.len() - self.pos < 4 {
            return Err(self.err(JsonErrorKind::Eof));
        }
        let mut cp = 0u32;
        for _ in 0..4 {
            let digit = (self.input[self.pos] as char)
                .to_digit(16)
                .ok_or_else(|| self.err(JsonErrorKind::BadChar))?;
            cp = (cp << 4) | digit;
            self.pos += 1;
        }
        Ok(cp)
    }

    /// Validates and copies one raw multi-byte UTF-8 sequence.
    fn decode_raw_utf8(&mut self, out: &mut Vec<u8>) -> Result<(), JsonError> {
        let trailing = match self.input[self.pos] {
            0xc2..=0xdf => 1,
            0xe0..=0xef => 2,
            0xf0..=0xf4 => 3,
            // stray continuation, overlong C0/C1 lead, or F5..FF
            _ => return Err(self.err(JsonErrorKind::BadChar)),
        };
        if self.input.len() - self.pos < trailing + 1 {
            return Err(self.err(JsonErrorKind::Eof));
        }
        let seq = &self.input[self.pos..self.pos + trailing + 1];
        // from_utf8 also rejects overlong encodings and surrogates
        if std::str::from_utf8(seq).is_err() {
            return Err(self.err(JsonErrorKind::BadChar));
        }
        out.extend_from_slice(seq);
        self.pos += trailing + 1;
        Ok(())
    }

    fn decode_array(&mut self) -> Result<(Vec<JsonValue>, Option<String>), JsonError> {
        if self.level == 0 {
            return Err(self.err(JsonErrorKind::NestingTooDeep));
        }
        self.level -= 1;
        self.pos += 1; // '['

        let mut elements = Vec::new();
        let mut inner = None;
        let mut after_separator = false;
        loop {
            if self.peek().is_none() {
                return Err(self.err(JsonErrorKind::Eof));
            }
            if self.peek_nonspace() == Some(b']') && !after_separator {
                // only an empty array reaches the close with whitespace
                // still pending; elements capture their own runs
                inner = self.decode_space();
                self.pos += 1;
                break;
            }
            elements.push(self.decode_value()?);
            after_separator = false;
            match self.peek() {
                None => return Err(self.err(JsonErrorKind::Eof)),
                Some(b',') => {
                    self.pos += 1;
                    after_separator = true;
                }
                Some(b']') => {}
                Some(_) => return Err(self.err(JsonErrorKind::BadChar)),
            }
        }

        self.level += 1;
        Ok((elements, inner))
    }

    fn decode_object(&mut self) -> Result<(JsonObject, Option<String>), JsonError> {
        if self.level == 0 {
            return Err(self.err(JsonErrorKind::NestingTooDeep));
        }
        self.level -= 1;
        self.pos += 1; // '{'

        let mut object = JsonObject::new();
        let mut inner = None;
        let mut after_separator = false;
        loop {
            if self.peek().is_none() {
                return Err(self.err(JsonErrorKind::Eof));
            }
            if self.peek_nonspace() == Some(b'}') && !after_separator {
                inner = self.decode_space();
                self.pos += 1;
                break;
            }

            let key_pre = self.decode_space();
            match self.peek() {
                None => return Err(self.err(JsonErrorKind::Eof)),
                Some(b'"') => {}
                Some(_) => return Err(self.err(JsonErrorKind::BadChar)),
            }
            let key_bytes = self.decode_string()?;
            let key_post = self.decode_space();
            let key = JsonValue {
                pre: key_pre,
                post: key_post,
                inner: None,
                kind: JsonKind::String(key_bytes),
            };

            match self.peek() {
                None => return Err(self.err(JsonErrorKind::Eof)),
                Some(b':') => self.pos += 1,
                Some(_) => return Err(self.err(JsonErrorKind::BadChar)),
            }
            if self.peek().is_none() {
                return Err(self.err(JsonErrorKind::Eof));
            }
            let value = self.decode_value()?;
            // a duplicate key overwrites the earlier member in place
            object.set_entry(key, value);

            after_separator = false;
            match self.peek() {
                None => return Err(self.err(JsonErrorKind::Eof)),
                Some(b',') => {
                    self.pos += 1;
                    after_separator = true;
                }
                Some(b'}') => {}
                Some(_) => return Err(self.err(JsonErrorKind::BadChar)),
            }
        }

        self.level += 1;
        Ok((object, inner))
    }
}
