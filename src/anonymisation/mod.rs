//! Anonymisation and redaction engines
//!
//! This module provides the handler capability traits, the registry that maps
//! record types to handlers, and the reporting built on top of them.
//!
//! # Architecture
//!
//! - **Handlers**: one per record type, implementing [`Handler`]
//! - **Object level**: [`FieldAnonymiser`] mutates one record through custom
//!   per-field functions
//! - **Set level**: [`FieldRedacter`] computes one value per field and applies
//!   it to a whole selection with a single update
//! - **Classifier**: [`AutoRedacters`] default values by field type
//! - **Registry**: [`Registry`] with fresh instances per lookup
//!
//! # Usage
//!
//! ```rust
//! use anonymiser::adapters::dynamic::DynamicRecord;
//! use anonymiser::adapters::storage::{MemoryStore, Selection};
//! use anonymiser::anonymisation::{FieldRedacter, Handler, RedactOptions};
//! use anonymiser::domain::RecordType;
//! use anonymiser::schema::{FieldDescriptor, Model, RecordSchema};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct NoteRedacter;
//!
//! impl Handler for NoteRedacter {
//!     type Record = DynamicRecord;
//!     fn schema(&self) -> RecordSchema {
//!         RecordSchema::new(RecordType::new("notes", "Note"))
//!             .field(FieldDescriptor::auto("id"))
//!             .field(FieldDescriptor::char("title", 5))
//!     }
//! }
//!
//! impl FieldRedacter for NoteRedacter {}
//!
//! let schema = Arc::new(NoteRedacter.schema());
//! let mut store = MemoryStore::new(NoteRedacter.schema());
//! store.insert(DynamicRecord::from_json(schema, json!({"id": 1, "title": "Hello"}))?)?;
//!
//! let count = NoteRedacter.redact_selection(&mut store, &Selection::all(), RedactOptions::new())?;
//! assert_eq!(count, 1);
//! assert_eq!(store.rows()[0].get("title"), Some("XXXXX".into()));
//! # Ok::<(), anonymiser::domain::AnonymiserError>(())
//! ```

pub mod anonymiser;
pub mod classifier;
pub mod configured;
pub mod handler;
pub mod redacter;
pub mod registry;
pub mod report;

// Re-export main types
pub use anonymiser::{AnonymiseFn, CustomAnonymiser, FieldAnonymiser};
pub use classifier::AutoRedacters;
pub use configured::{register_configured_models, registry_from_config, ConfiguredHandler};
pub use handler::{Handler, HandlerInfo};
pub use redacter::{FieldRedacter, RedactOptions, RedactionStrategy};
pub use registry::{DynAnonymiser, DynRedacter, Registry};
pub use report::{FieldSummary, ModelAnonymiserSummary};
