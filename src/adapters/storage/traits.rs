//! Storage abstraction traits
//!
//! This module defines the interface the storage layer must provide to the
//! anonymisation engines. Every call is synchronous and may be slow; there is
//! no timeout or retry at this layer.

use super::selection::Selection;
use crate::domain::{RedactionValues, StorageError};
use crate::schema::Model;

/// Record storage for one record type
///
/// The trait is object safe; engines take `&mut dyn RecordStore<R>`.
pub trait RecordStore<R: Model> {
    /// Load every record matching the selection
    ///
    /// # Errors
    ///
    /// Returns an error if the backend query fails.
    fn fetch(&self, selection: &Selection) -> Result<Vec<R>, StorageError>;

    /// Count records matching the selection
    fn count(&self, selection: &Selection) -> Result<usize, StorageError>;

    /// Persist a single record (insert or replace by primary key)
    ///
    /// # Errors
    ///
    /// Returns an error on constraint violations.
    fn save(&mut self, record: &R) -> Result<(), StorageError>;

    /// Apply `values` to every record in the selection as one set-based update
    ///
    /// Expressions inside `values` are evaluated per affected row. Returns the
    /// number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the update cannot be applied; no row is changed in
    /// that case.
    fn update(&mut self, selection: &Selection, values: &RedactionValues)
        -> Result<usize, StorageError>;
}
