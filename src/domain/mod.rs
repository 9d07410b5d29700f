//! Domain models and types for the anonymiser.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record type identifier** ([`RecordType`])
//! - **Values** ([`FieldValue`], [`RedactionValue`], [`Expression`])
//! - **Snapshots** ([`FieldUpdate`], [`FieldUpdates`])
//! - **Error types** ([`AnonymiserError`], [`StorageError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, AnonymiserError>`]:
//!
//! ```rust
//! use anonymiser::domain::{AnonymiserError, RecordType, Result};
//!
//! fn parse(label: &str) -> Result<RecordType> {
//!     label.parse().map_err(AnonymiserError::Configuration)
//! }
//! assert!(parse("tests.User").is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod value;

// Re-export commonly used types for convenience
pub use errors::{AnonymiserError, StorageError};
pub use ids::RecordType;
pub use result::Result;
pub use value::{Expression, FieldUpdate, FieldUpdates, FieldValue, RedactionValue, RedactionValues};
