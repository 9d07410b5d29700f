//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod describe;
pub mod redact;
pub mod validate;
