//! Errors raised while converting persisted raw values.

use thiserror::Error;

/// Failures converting a value to or from its JSON raw value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    /// The value could not be serialised.
    #[error("failed to encode raw value: {0}")]
    Encode(#[source] serde_json::Error),

    /// The raw value was not valid JSON for the target type.
    #[error("failed to decode raw value: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result alias for raw-value conversions.
pub type PersistenceResult<T> = Result<T, PersistenceError>;
