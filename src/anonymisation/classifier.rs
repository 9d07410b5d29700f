//! Field classification and default redaction values
//!
//! Pure functions deciding whether a field may be auto-redacted, and the
//! [`AutoRedacters`] table of default value generators keyed by field type.
//! The built-in table is a base layer: callers can replace, add or disable
//! entries, either in code or through the `[auto_redact]` config section.

use crate::config::schema::AutoRedactConfig;
use crate::domain::{AnonymiserError, Expression, FieldValue, RedactionValue, Result};
use crate::schema::{FieldDescriptor, FieldType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Fill character used by the built-in text generators
pub const DEFAULT_FILL_CHAR: char = 'X';

/// Length of the fill string for unbounded text fields
pub const DEFAULT_TEXT_LENGTH: usize = 400;

/// Generator producing the replacement value for one field
///
/// Receives the field and the current time of the redaction call.
pub type GeneratorFn = Arc<dyn Fn(&FieldDescriptor, DateTime<Utc>) -> RedactionValue + Send + Sync>;

type ClockFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// True unless the field is a relation, primary key, unique or has choices
///
/// These flags make a field unsafe to overwrite with a generated value.
pub fn is_redactable(field: &FieldDescriptor) -> bool {
    !(field.is_relation || field.is_primary_key || field.is_unique || field.has_choices)
}

/// Full auto-redaction eligibility check
///
/// The field must be redactable, not excluded, and its type must have a
/// generator in `table`.
pub fn is_eligible_for_auto_redaction(
    field: &FieldDescriptor,
    exclusions: &[&str],
    table: &AutoRedacters,
) -> bool {
    is_redactable(field)
        && !exclusions.contains(&field.name.as_str())
        && table.supports(field.field_type)
}

/// Default value generators keyed by field type
#[derive(Clone)]
pub struct AutoRedacters {
    generators: HashMap<FieldType, GeneratorFn>,
    clock: ClockFn,
}

impl AutoRedacters {
    /// Built-in table with a custom fill character and text length
    pub fn builtin(fill_char: char, text_length: usize) -> Self {
        let mut table = Self::empty();
        table.generators.insert(
            FieldType::Char,
            Arc::new(move |field, _| {
                let len = field.max_length.unwrap_or(text_length);
                RedactionValue::literal(fill_char.to_string().repeat(len))
            }),
        );
        table.generators.insert(
            FieldType::Text,
            Arc::new(move |_, _| RedactionValue::literal(fill_char.to_string().repeat(text_length))),
        );
        table.generators.insert(
            FieldType::Date,
            Arc::new(|_, now| RedactionValue::literal(now.date_naive())),
        );
        table.generators.insert(
            FieldType::DateTime,
            Arc::new(|_, now| RedactionValue::literal(now)),
        );
        table.generators.insert(
            FieldType::Json,
            Arc::new(|_, _| RedactionValue::literal(serde_json::json!({}))),
        );
        // generated by the storage layer so each row gets its own value
        table.generators.insert(
            FieldType::Uuid,
            Arc::new(|_, _| RedactionValue::Expression(Expression::GenerateUuid4)),
        );
        table
    }

    /// Table with no generators at all
    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Build the table described by the `[auto_redact]` config section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an override value cannot be used.
    pub fn from_config(config: &AutoRedactConfig) -> Result<Self> {
        let mut table = Self::builtin(config.fill_char, config.text_length);
        for field_type in &config.disabled {
            table = table.without(*field_type);
        }
        let overrides = config.typed_overrides().map_err(|e| {
            AnonymiserError::Configuration(format!("Invalid auto_redact override: {e}"))
        })?;
        for (field_type, value) in overrides {
            table = table.with_value(field_type, value);
        }
        Ok(table)
    }

    /// Add or replace the generator for a field type
    pub fn with_generator<F>(mut self, field_type: FieldType, generator: F) -> Self
    where
        F: Fn(&FieldDescriptor, DateTime<Utc>) -> RedactionValue + Send + Sync + 'static,
    {
        self.generators.insert(field_type, Arc::new(generator));
        self
    }

    /// Replace the generator for a field type with a fixed value
    pub fn with_value(self, field_type: FieldType, value: RedactionValue) -> Self {
        self.with_generator(field_type, move |_, _| value.clone())
    }

    /// Stop auto-redacting a field type
    pub fn without(mut self, field_type: FieldType) -> Self {
        self.generators.remove(&field_type);
        self
    }

    /// Use a fixed clock for date and date-time generators
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn supports(&self, field_type: FieldType) -> bool {
        self.generators.contains_key(&field_type)
    }

    /// Generate the replacement value for `field`, if its type has a generator
    pub fn generate(&self, field: &FieldDescriptor) -> Option<RedactionValue> {
        self.generate_at(field, (self.clock)())
    }

    /// Same as [`generate`](Self::generate) with an explicit timestamp
    pub fn generate_at(&self, field: &FieldDescriptor, now: DateTime<Utc>) -> Option<RedactionValue> {
        self.generators
            .get(&field.field_type)
            .map(|generator| generator(field, now))
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for AutoRedacters {
    fn default() -> Self {
        Self::builtin(DEFAULT_FILL_CHAR, DEFAULT_TEXT_LENGTH)
    }
}

impl fmt::Debug for AutoRedacters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.generators.keys().copied().collect();
        types.sort();
        f.debug_struct("AutoRedacters").field("types", &types).finish()
    }
}

/// Fill string for a bounded text field, as produced by the built-in table
pub fn fill_string(len: usize) -> FieldValue {
    FieldValue::Text(DEFAULT_FILL_CHAR.to_string().repeat(len))
}
