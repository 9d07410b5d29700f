//! Schema boundary
//!
//! Field and record metadata as exposed by the ORM-like layer, plus the
//! [`Model`] trait through which the core reads and writes record fields.

pub mod field;
pub mod record;

pub use field::{FieldDescriptor, FieldType};
pub use record::{Model, RecordSchema};
