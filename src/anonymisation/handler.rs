//! Handler base trait and the type-erased handler view
//!
//! Every anonymiser or redacter is a [`Handler`]: a value bound to one record
//! type through its [`RecordSchema`]. Capabilities are layered on top as the
//! [`FieldAnonymiser`](super::FieldAnonymiser) and
//! [`FieldRedacter`](super::FieldRedacter) traits.
//!
//! The registry hands out [`HandlerInfo`] trait objects so that callers can
//! inspect a handler without knowing its concrete type.

use super::redacter::RedactionStrategy;
use crate::domain::RecordType;
use crate::schema::{FieldDescriptor, Model, RecordSchema};

/// Base trait for all handlers
///
/// # Examples
///
/// ```
/// use anonymiser::anonymisation::Handler;
/// use anonymiser::adapters::dynamic::DynamicRecord;
/// use anonymiser::domain::RecordType;
/// use anonymiser::schema::{FieldDescriptor, RecordSchema};
///
/// struct NoteHandler;
///
/// impl Handler for NoteHandler {
///     type Record = DynamicRecord;
///
///     fn schema(&self) -> RecordSchema {
///         RecordSchema::new(RecordType::new("notes", "Note"))
///             .field(FieldDescriptor::auto("id"))
///             .field(FieldDescriptor::text("body"))
///     }
/// }
///
/// assert_eq!(NoteHandler.name(), "NoteHandler");
/// assert_eq!(NoteHandler.record_type().label(), "notes.Note");
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Concrete record type this handler operates on
    type Record: Model;

    /// Schema of the record type, including its identity
    fn schema(&self) -> RecordSchema;

    /// Handler name used in reports and error messages
    fn name(&self) -> String {
        short_type_name::<Self>().to_string()
    }

    fn record_type(&self) -> RecordType {
        self.schema().record_type().clone()
    }

    /// Concrete fields of the record type, reverse relations excluded
    fn model_fields(&self) -> Vec<FieldDescriptor> {
        self.schema().concrete_fields().into_iter().cloned().collect()
    }
}

/// Object-safe view of a registered handler
///
/// Returned by [`Registry::lookup`](super::Registry::lookup). Each lookup
/// builds a fresh handler instance.
pub trait HandlerInfo: Send + Sync {
    fn name(&self) -> String;

    fn schema(&self) -> RecordSchema;

    fn record_type(&self) -> RecordType {
        self.schema().record_type().clone()
    }

    /// True if the handler was registered with the anonymiser capability
    fn is_anonymiser(&self) -> bool;

    /// True if the handler was registered with the redacter capability
    fn is_redacter(&self) -> bool;

    /// True if the handler has a custom anonymise function for `field`
    fn is_field_anonymised(&self, field: &str) -> bool;

    /// How a set-level redaction would treat `field`
    fn field_redaction_strategy(&self, field: &FieldDescriptor) -> RedactionStrategy;
}

/// Last path segment of a type name, without generic arguments
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
