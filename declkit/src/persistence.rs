//! Raw-value persistence.
//!
//! `#[derive(Persistence)]` gives a struct two interchangeable encodings: a
//! keyed serde representation, and a single `String` raw value holding that
//! representation as JSON. The helpers here back the raw value. The lossy
//! pair never fails: encoding falls back to an empty string and decoding to
//! `None`, with the cause logged at `warn` level. The `try_` pair surfaces
//! the [`PersistenceError`] instead.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{PersistenceError, PersistenceResult};

/// A type convertible to and from a single raw value.
pub trait RawRepresentable: Sized {
    /// The raw representation.
    type RawValue;

    /// This value as its raw representation.
    fn raw_value(&self) -> Self::RawValue;

    /// Rebuild a value, or `None` when `raw_value` does not describe one.
    fn from_raw_value(raw_value: Self::RawValue) -> Option<Self>;
}

/// A type with both persistence encodings: keyed serde and a JSON string
/// raw value.
pub trait Persistable: Serialize + DeserializeOwned + RawRepresentable<RawValue = String> {}

/// Serialise `value` to its JSON raw value.
///
/// # Errors
///
/// Returns [`PersistenceError::Encode`] when `value` cannot be represented
/// as JSON, for example a map with non-string keys.
pub fn try_encode_raw_value<T: Serialize>(value: &T) -> PersistenceResult<String> {
    serde_json::to_string(value).map_err(PersistenceError::Encode)
}

/// Deserialise a value from its JSON raw value.
///
/// # Errors
///
/// Returns [`PersistenceError::Decode`] when `raw_value` is not valid JSON
/// for `T`.
pub fn try_decode_raw_value<T: DeserializeOwned>(raw_value: &str) -> PersistenceResult<T> {
    serde_json::from_str(raw_value).map_err(PersistenceError::Decode)
}

/// Serialise `value` to JSON, or an empty string if that fails.
#[must_use]
pub fn encode_raw_value<T: Serialize>(value: &T) -> String {
    try_encode_raw_value(value).unwrap_or_else(|err| {
        tracing::warn!(
            type_name = std::any::type_name::<T>(),
            error = %err,
            "failed to encode raw value; using an empty string"
        );
        String::new()
    })
}

/// Deserialise a value from JSON, or `None` if that fails.
#[must_use]
pub fn decode_raw_value<T: DeserializeOwned>(raw_value: &str) -> Option<T> {
    try_decode_raw_value(raw_value)
        .map_err(|err| {
            tracing::warn!(
                type_name = std::any::type_name::<T>(),
                error = %err,
                "failed to decode raw value"
            );
        })
        .ok()
}
