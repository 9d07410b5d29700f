//! Storage-facing adapters
//!
//! - [`storage`] - the [`storage::RecordStore`] seam and an in-memory store
//! - [`dynamic`] - JSON-backed records for config-driven models
//! - [`sql`] - SQL rendering of set-level updates

pub mod dynamic;
pub mod sql;
pub mod storage;
