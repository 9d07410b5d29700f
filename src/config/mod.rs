//! Configuration management for the anonymiser.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Configuration files support:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ANONYMISER_*` environment overrides
//! - Default values for optional settings
//! - Validation with descriptive errors
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use anonymiser::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("anonymiser.toml")?;
//! for model in &config.models {
//!     println!("{} ({} fields)", model.model, model.fields.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`LoggingConfig`] - Local file logging
//! - [`AutoRedactConfig`] - Default value generators
//! - [`ModelConfig`] - Config-driven model handlers
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [auto_redact]
//! fill_char = "X"
//! text_length = 400
//! disabled = ["JSONField"]
//!
//! [[models]]
//! model = "accounts.User"
//! exclude = ["location"]
//! fields = [
//!     { name = "id", type = "AutoField", primary_key = true },
//!     { name = "first_name", type = "CharField", max_length = 150 },
//!     { name = "location", type = "CharField", max_length = 255 },
//!     { name = "uuid", type = "UUIDField", unique = true },
//! ]
//!
//! [models.custom]
//! first_name = "${ANONYMISER_FIRST_NAME}"
//! uuid = { uuid = true }
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AnonymiserConfig, ApplicationConfig, AutoRedactConfig, ConfigValue, FieldConfig,
    LoggingConfig, ModelConfig,
};

/// Serialises tests that read or mutate `ANONYMISER_*` environment variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
