//! Domain error types
//!
//! This module defines the error hierarchy for the anonymiser. Registry and
//! engine failures surface as [`AnonymiserError`]; failures reported by the
//! storage layer are carried as [`StorageError`] and passed through unchanged.

use thiserror::Error;

/// Main anonymiser error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum AnonymiserError {
    /// Handler or configuration file is invalid (e.g. no record type set)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A second handler was registered for an already covered record type
    #[error("Handler for {record_type} already registered ({existing})")]
    DuplicateRegistration {
        record_type: String,
        existing: String,
    },

    /// `anonymise_field` was called for a field without a custom function
    #[error("Anonymiser function 'anonymise_{field}' not implemented on {handler}")]
    NotImplemented { handler: String, field: String },

    /// The field does not exist on the record type
    #[error("Unknown field '{field}' on {record_type}")]
    UnknownField { record_type: String, field: String },

    /// Errors raised by the storage layer, propagated verbatim
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Storage-layer errors
///
/// Returned by [`RecordStore`](crate::adapters::storage::RecordStore)
/// implementations and never translated by the engines.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// Unique constraint violated on save or update
    #[error("Unique constraint violated: {field} = {value}")]
    UniqueViolation { field: String, value: String },

    /// The record has no such field
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The value does not fit the field's declared type
    #[error("Type mismatch for field {field}: expected {expected}")]
    TypeMismatch { field: String, expected: String },

    /// The backend cannot express the requested operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Generic backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for AnonymiserError {
    fn from(err: std::io::Error) -> Self {
        AnonymiserError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AnonymiserError {
    fn from(err: serde_json::Error) -> Self {
        AnonymiserError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for AnonymiserError {
    fn from(err: toml::de::Error) -> Self {
        AnonymiserError::Configuration(format!("TOML parse error: {err}"))
    }
}
