//! Text codec: canonical string forms for typed settings values.
//!
//! Every value in the cache is a `String`.  Typed values only exist at the
//! accessor boundary, where this module converts them in both directions:
//!
//! | Type                      | Canonical form                          |
//! |---------------------------|-----------------------------------------|
//! | `bool`                    | `"1"` / `"0"`                           |
//! | `i32`, `i64`              | invariant decimal, e.g. `"-42"`         |
//! | `f64`                     | invariant decimal, e.g. `"0.25"`        |
//! | `Vec<u8>`                 | lowercase hex, two digits per byte      |
//! | `chrono::NaiveDateTime`   | ISO-8601 sortable, `2024-03-01T08:15:00`|
//!
//! Decoding failures produce a [`CodecError`].  The store never propagates
//! these to its callers; a malformed value degrades to the caller's default.

pub mod bytes;
pub mod timestamp;

use thiserror::Error;

pub use bytes::{decode_bytes, encode_bytes};
pub use timestamp::{decode_timestamp, encode_timestamp};

/// A stored string could not be decoded into the requested type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid boolean: {0:?}")]
    InvalidBool(String),

    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),

    #[error("invalid floating point number: {0:?}")]
    InvalidFloat(String),

    #[error("invalid hex byte string: {0:?}")]
    InvalidHex(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// A type that can be stored in the settings file.
///
/// `to_ini` must produce a string that `from_ini` accepts and maps back to an
/// equal value.
pub trait IniValue: Sized {
    /// Encodes the value into its canonical string form.
    fn to_ini(&self) -> String;

    /// Decodes a stored string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if `raw` is not a valid encoding of `Self`.
    fn from_ini(raw: &str) -> Result<Self, CodecError>;
}

impl IniValue for String {
    fn to_ini(&self) -> String {
        self.clone()
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        Ok(raw.to_string())
    }
}

/// Booleans are stored as 32-bit integers: any non-zero value reads as
/// `true`, anything outside `i32` is malformed.
impl IniValue for bool {
    fn to_ini(&self) -> String {
        String::from(if *self { "1" } else { "0" })
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        raw.trim()
            .parse::<i32>()
            .map(|n| n != 0)
            .map_err(|_| CodecError::InvalidBool(raw.to_string()))
    }
}

impl IniValue for i32 {
    fn to_ini(&self) -> String {
        self.to_string()
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        raw.trim()
            .parse()
            .map_err(|_| CodecError::InvalidInteger(raw.to_string()))
    }
}

impl IniValue for i64 {
    fn to_ini(&self) -> String {
        self.to_string()
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        raw.trim()
            .parse()
            .map_err(|_| CodecError::InvalidInteger(raw.to_string()))
    }
}

/// `f64`'s `Display` is locale-independent and prints the shortest string
/// that parses back to the same bits.
impl IniValue for f64 {
    fn to_ini(&self) -> String {
        self.to_string()
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        raw.trim()
            .parse()
            .map_err(|_| CodecError::InvalidFloat(raw.to_string()))
    }
}

impl IniValue for Vec<u8> {
    fn to_ini(&self) -> String {
        encode_bytes(self)
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        decode_bytes(raw)
    }
}

impl IniValue for chrono::NaiveDateTime {
    fn to_ini(&self) -> String {
        encode_timestamp(self)
    }

    fn from_ini(raw: &str) -> Result<Self, CodecError> {
        decode_timestamp(raw)
    }
}
