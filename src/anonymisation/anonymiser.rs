//! Object-level anonymisation
//!
//! A [`FieldAnonymiser`] declares one custom function per field it
//! anonymises. Running the handler over a record mutates the record in
//! memory, collects an old/new snapshot per field and passes the snapshot to
//! [`FieldAnonymiser::post_anonymise_object`]. Persisting is up to the caller,
//! except for [`FieldAnonymiser::anonymise_selection`] which saves each record.
//!
//! Custom functions receive the handler by shared reference. A function that
//! tries to keep state on the handler does not type-check:
//!
//! ```compile_fail
//! # use anonymiser::adapters::dynamic::DynamicRecord;
//! # use anonymiser::anonymisation::{CustomAnonymiser, FieldAnonymiser, Handler};
//! # use anonymiser::domain::RecordType;
//! # use anonymiser::schema::RecordSchema;
//! struct Counting {
//!     calls: usize,
//! }
//!
//! impl Counting {
//!     fn anonymise_name(&mut self, _obj: &mut DynamicRecord) {
//!         self.calls += 1;
//!     }
//! }
//!
//! # impl Handler for Counting {
//! #     type Record = DynamicRecord;
//! #     fn schema(&self) -> RecordSchema { RecordSchema::new(RecordType::new("a", "B")) }
//! # }
//! impl FieldAnonymiser for Counting {
//!     const FIELD_ANONYMISERS: &'static [CustomAnonymiser<Self>] =
//!         &[CustomAnonymiser::new("name", Self::anonymise_name)];
//! }
//! ```

use super::handler::Handler;
use crate::adapters::storage::{RecordStore, Selection};
use crate::domain::{AnonymiserError, FieldUpdate, FieldUpdates, Result};
use crate::schema::{FieldDescriptor, Model};
use tracing::{debug, info};

/// Custom anonymise function for one field
pub type AnonymiseFn<H> = fn(&H, &mut <H as Handler>::Record);

/// Binding of a field name to its custom anonymise function
pub struct CustomAnonymiser<H: Handler> {
    pub field: &'static str,
    pub apply: AnonymiseFn<H>,
}

impl<H: Handler> CustomAnonymiser<H> {
    pub const fn new(field: &'static str, apply: AnonymiseFn<H>) -> Self {
        Self { field, apply }
    }
}

/// Object-level anonymisation capability
///
/// # Examples
///
/// ```
/// use anonymiser::anonymisation::{CustomAnonymiser, FieldAnonymiser, Handler};
/// use anonymiser::domain::{FieldValue, RecordType, StorageError};
/// use anonymiser::schema::{FieldDescriptor, Model, RecordSchema};
///
/// struct User {
///     first_name: String,
/// }
///
/// # impl Model for User {
/// #     fn get(&self, field: &str) -> Option<FieldValue> {
/// #         (field == "first_name").then(|| self.first_name.clone().into())
/// #     }
/// #     fn set(&mut self, field: &str, _value: FieldValue) -> Result<(), StorageError> {
/// #         Err(StorageError::UnknownField(field.to_string()))
/// #     }
/// # }
/// struct UserAnonymiser;
///
/// impl UserAnonymiser {
///     fn anonymise_first_name(&self, obj: &mut User) {
///         obj.first_name = "Anonymous".to_string();
///     }
/// }
///
/// impl Handler for UserAnonymiser {
///     type Record = User;
///
///     fn schema(&self) -> RecordSchema {
///         RecordSchema::new(RecordType::new("tests", "User"))
///             .field(FieldDescriptor::char("first_name", 150))
///     }
/// }
///
/// impl FieldAnonymiser for UserAnonymiser {
///     const FIELD_ANONYMISERS: &'static [CustomAnonymiser<Self>] =
///         &[CustomAnonymiser::new("first_name", Self::anonymise_first_name)];
/// }
///
/// let mut user = User { first_name: "fred".to_string() };
/// let updates = UserAnonymiser.anonymise_object(&mut user).unwrap();
/// assert_eq!(user.first_name, "Anonymous");
/// assert_eq!(updates["first_name"].old, Some("fred".into()));
/// ```
pub trait FieldAnonymiser: Handler + Sized {
    /// Custom anonymise functions, one per field
    const FIELD_ANONYMISERS: &'static [CustomAnonymiser<Self>];

    fn custom_anonymiser(&self, field: &str) -> Option<&'static CustomAnonymiser<Self>> {
        Self::FIELD_ANONYMISERS.iter().find(|a| a.field == field)
    }

    /// True if a custom function exists for `field`
    fn is_field_anonymised(&self, field: &str) -> bool {
        self.custom_anonymiser(field).is_some()
    }

    /// Concrete fields that have a custom function
    fn anonymisable_fields(&self) -> Vec<FieldDescriptor> {
        self.model_fields()
            .into_iter()
            .filter(|f| self.is_field_anonymised(&f.name))
            .collect()
    }

    /// Run the custom function for one field and snapshot the change
    ///
    /// # Errors
    ///
    /// Returns [`AnonymiserError::NotImplemented`] if no custom function
    /// exists for `field`. The record is left untouched in that case.
    fn anonymise_field(&self, obj: &mut Self::Record, field: &str) -> Result<FieldUpdate> {
        let anonymiser =
            self.custom_anonymiser(field)
                .ok_or_else(|| AnonymiserError::NotImplemented {
                    handler: self.name(),
                    field: field.to_string(),
                })?;

        let old = obj.get(field);
        (anonymiser.apply)(self, obj);
        let new = obj.get(field);

        debug!(handler = %self.name(), field, "Field anonymised");
        Ok(FieldUpdate::new(old, new))
    }

    /// Anonymise every anonymisable field, then call the post hook
    ///
    /// Does not persist the record.
    fn anonymise_object(&self, obj: &mut Self::Record) -> Result<FieldUpdates> {
        let mut updates = FieldUpdates::new();
        for field in self.anonymisable_fields() {
            let update = self.anonymise_field(obj, &field.name)?;
            updates.insert(field.name, update);
        }
        self.post_anonymise_object(obj, &updates);
        Ok(updates)
    }

    /// Hook called once per object after all fields are anonymised
    ///
    /// Receives exactly one entry per anonymised field.
    fn post_anonymise_object(&self, _obj: &mut Self::Record, _updates: &FieldUpdates) {}

    /// Records for which this returns true are skipped by
    /// [`anonymise_selection`](Self::anonymise_selection)
    fn exclude_from_selection(&self, _obj: &Self::Record) -> bool {
        false
    }

    /// Anonymise and save every record in the selection, one at a time
    ///
    /// Returns the number of records processed.
    ///
    /// # Errors
    ///
    /// Stops at the first failing record. Records saved before the failure
    /// stay saved.
    fn anonymise_selection(
        &self,
        store: &mut dyn RecordStore<Self::Record>,
        selection: &Selection,
    ) -> Result<usize> {
        let record_type = self.record_type();
        let mut count = 0;
        for mut record in store.fetch(selection)? {
            if self.exclude_from_selection(&record) {
                continue;
            }
            self.anonymise_object(&mut record)?;
            store.save(&record)?;
            count += 1;
        }

        crate::log_selection_processed!("anonymise", record_type, count);
        info!(handler = %self.name(), "Anonymisation complete");
        Ok(count)
    }
}
