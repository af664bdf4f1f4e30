// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Order-preserving JSON value model and codec.
//!
//! This crate exists because JOSE processing needs properties an ordinary
//! JSON library does not promise: object members stay in wire order,
//! surrounding whitespace can be captured and replayed for byte-exact
//! round trips, nesting depth is bounded by the caller, and decode errors
//! report the byte offset at which scanning stopped. It knows nothing
//! about JOSE itself.

mod decode;
mod encode;
mod error;
mod value;

pub use decode::decode;
pub use encode::encode;
pub use error::{JsonError, JsonErrorKind};
pub use value::{overlay, JsonEntry, JsonKind, JsonObject, JsonValue};
