//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels
//! - Console output on stderr
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use anonymiser::logging::init_logging;
//! use anonymiser::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{cli_logging_settings, init_logging, LoggingGuard};

/// Log the completion of a selection-wide operation
///
/// # Example
///
/// ```no_run
/// use anonymiser::log_selection_processed;
/// use anonymiser::domain::RecordType;
///
/// let record_type = RecordType::new("accounts", "User");
/// log_selection_processed!("redact", record_type, 42);
/// ```
#[macro_export]
macro_rules! log_selection_processed {
    ($operation:expr, $record_type:expr, $count:expr) => {
        tracing::info!(
            operation = $operation,
            record_type = %$record_type,
            count = $count,
            "Selection processed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use anonymiser::log_error_with_context;
/// use anonymiser::domain::AnonymiserError;
///
/// let error = AnonymiserError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
