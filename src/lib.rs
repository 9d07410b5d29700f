// Anonymiser - field-level anonymisation and redaction of stored records
// Copyright (c) 2025 Anonymiser Contributors
// Licensed under the MIT License

//! # Anonymiser
//!
//! Field-level anonymisation and bulk redaction of records held in a
//! relational store.
//!
//! ## Overview
//!
//! A record type is handled by an application-supplied handler that can offer
//! two capabilities:
//!
//! - **Anonymise** ([`anonymisation::FieldAnonymiser`]) - per-field custom
//!   functions run on one record at a time, then the record is saved
//! - **Redact** ([`anonymisation::FieldRedacter`]) - one replacement value per
//!   field, applied to a whole selection with a single set-based update
//!
//! Handlers are looked up by record type through a
//! [`anonymisation::Registry`].
//!
//! ## Architecture
//!
//! - [`anonymisation`] - capability traits, classifier, registry and reporting
//! - [`schema`] - field descriptors, record schemas and the [`schema::Model`] trait
//! - [`adapters`] - storage seam, in-memory store, JSON records, SQL rendering
//! - [`domain`] - record types, values and errors
//! - [`config`] - TOML configuration
//! - [`logging`] - structured logging
//! - [`cli`] - command-line interface
//!
//! ## Quick Start
//!
//! ```rust
//! use anonymiser::adapters::storage::{MemoryStore, Selection};
//! use anonymiser::anonymisation::{FieldRedacter, Handler, RedactOptions};
//! use anonymiser::domain::{FieldValue, RecordType, RedactionValues, StorageError};
//! use anonymiser::schema::{FieldDescriptor, Model, RecordSchema};
//!
//! #[derive(Clone)]
//! struct Note {
//!     id: i64,
//!     body: String,
//! }
//!
//! impl Model for Note {
//!     fn get(&self, field: &str) -> Option<FieldValue> {
//!         match field {
//!             "id" => Some(self.id.into()),
//!             "body" => Some(self.body.clone().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: FieldValue) -> Result<(), StorageError> {
//!         match (field, value) {
//!             ("body", FieldValue::Text(s)) => self.body = s,
//!             (field, _) => return Err(StorageError::UnknownField(field.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! struct NoteRedacter;
//!
//! impl Handler for NoteRedacter {
//!     type Record = Note;
//!
//!     fn schema(&self) -> RecordSchema {
//!         RecordSchema::new(RecordType::new("notes", "Note"))
//!             .field(FieldDescriptor::auto("id"))
//!             .field(FieldDescriptor::text("body"))
//!     }
//! }
//!
//! impl FieldRedacter for NoteRedacter {
//!     fn custom_field_redactions(&self) -> RedactionValues {
//!         RedactionValues::new().with("body", "[removed]")
//!     }
//! }
//!
//! let mut store = MemoryStore::new(NoteRedacter.schema());
//! store.insert(Note { id: 1, body: "call me".into() }).unwrap();
//!
//! let count = NoteRedacter
//!     .redact_selection(&mut store, &Selection::all(), RedactOptions::new())
//!     .unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(store.rows()[0].body, "[removed]");
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`] with [`domain::AnonymiserError`].
//! Storage failures surface unchanged as [`domain::AnonymiserError::Storage`].
//!
//! ## Logging
//!
//! Engines and the registry emit `tracing` events; the binary installs a
//! subscriber with [`logging::init_logging`].

pub mod adapters;
pub mod anonymisation;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod schema;
