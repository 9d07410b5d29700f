//! Storage boundary
//!
//! The engines never talk to a database directly. They go through
//! [`RecordStore`], which provides object saves and a single set-based update.

pub mod memory;
pub mod selection;
pub mod traits;

pub use memory::MemoryStore;
pub use selection::{Condition, Selection};
pub use traits::RecordStore;
