//! Result type alias for the anonymiser

use super::errors::AnonymiserError;

/// Result type alias for anonymiser operations
///
/// # Examples
///
/// ```
/// use anonymiser::domain::result::Result;
/// use anonymiser::domain::errors::AnonymiserError;
///
/// fn failing_function() -> Result<()> {
///     Err(AnonymiserError::Configuration("no model".to_string()))
/// }
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, AnonymiserError>;
