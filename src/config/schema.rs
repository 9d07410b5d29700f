//! Configuration schema types
//!
//! This module defines the configuration structure for the anonymiser.

use crate::anonymisation::classifier::{DEFAULT_FILL_CHAR, DEFAULT_TEXT_LENGTH};
use crate::domain::{Expression, FieldValue, RecordType, RedactionValue};
use crate::schema::{FieldDescriptor, FieldType, RecordSchema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Main anonymiser configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnonymiserConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Default value generators
    #[serde(default)]
    pub auto_redact: AutoRedactConfig,

    /// Config-driven model handlers
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

impl AnonymiserConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.logging.validate()?;
        self.auto_redact.validate()?;

        let mut seen = HashSet::new();
        for model in &self.models {
            model.validate()?;
            if !seen.insert(model.model.as_str()) {
                return Err(format!("Model '{}' is configured more than once", model.model));
            }
        }
        Ok(())
    }

    /// Find the configuration for a model label
    pub fn model(&self, label: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.model == label)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rolling files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Rotation period (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Settings for the default value generators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRedactConfig {
    /// Character repeated to fill text fields
    #[serde(default = "default_fill_char")]
    pub fill_char: char,

    /// Fill length for unbounded text fields
    #[serde(default = "default_text_length")]
    pub text_length: usize,

    /// Field types that are never auto-redacted
    #[serde(default)]
    pub disabled: Vec<FieldType>,

    /// Fixed values per field type name, replacing the built-in generator
    #[serde(default)]
    pub overrides: BTreeMap<String, ConfigValue>,
}

impl AutoRedactConfig {
    fn validate(&self) -> Result<(), String> {
        if self.text_length == 0 {
            return Err("auto_redact.text_length must be > 0".to_string());
        }
        for (field_type, value) in &self.overrides {
            field_type.parse::<FieldType>()?;
            value.to_redaction_value()?;
        }
        Ok(())
    }

    /// Overrides keyed by parsed field type
    pub fn typed_overrides(&self) -> Result<Vec<(FieldType, RedactionValue)>, String> {
        self.overrides
            .iter()
            .map(|(field_type, value)| Ok((field_type.parse()?, value.to_redaction_value()?)))
            .collect()
    }
}

impl Default for AutoRedactConfig {
    fn default() -> Self {
        Self {
            fill_char: default_fill_char(),
            text_length: default_text_length(),
            disabled: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }
}

/// A redaction value as written in TOML
///
/// Tables select an expression, anything else is a literal:
///
/// ```toml
/// first_name = "FIRST_NAME"
/// uuid = { uuid = true }
/// username = { field = "uuid" }
/// email = { concat = ["user_", { field = "id" }, "@example.com"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Uuid { uuid: bool },
    Field { field: String },
    Concat { concat: Vec<ConfigValue> },
    Literal(serde_json::Value),
}

impl ConfigValue {
    /// Convert to a redaction value
    pub fn to_redaction_value(&self) -> Result<RedactionValue, String> {
        match self {
            Self::Uuid { uuid: true } => Ok(Expression::GenerateUuid4.into()),
            Self::Uuid { uuid: false } => {
                Err("'uuid = false' is not a redaction value".to_string())
            }
            Self::Field { field } => Ok(Expression::field(field.clone()).into()),
            Self::Concat { concat } => {
                let parts = concat
                    .iter()
                    .map(ConfigValue::to_redaction_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expression::Concat(parts).into())
            }
            Self::Literal(value) => Ok(RedactionValue::Literal(literal(value))),
        }
    }
}

fn literal(value: &serde_json::Value) -> FieldValue {
    use serde_json::Value;
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| n.as_f64().map(FieldValue::Float))
            .unwrap_or(FieldValue::Null),
        Value::String(s) => FieldValue::Text(s.clone()),
        other => FieldValue::Json(other.clone()),
    }
}

/// One field of a configured model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,

    /// Field type, class name (`CharField`) or short name (`char`)
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub max_length: Option<usize>,

    #[serde(default)]
    pub primary_key: bool,

    #[serde(default)]
    pub unique: bool,

    /// Field has a fixed set of choices
    #[serde(default)]
    pub choices: bool,

    /// Reverse relation pseudo-field
    #[serde(default)]
    pub reverse: bool,
}

impl FieldConfig {
    pub fn to_descriptor(&self) -> FieldDescriptor {
        let mut field = FieldDescriptor::new(self.name.clone(), self.field_type);
        if let Some(max_length) = self.max_length {
            field = field.max_length(max_length);
        }
        if self.primary_key {
            field = field.primary_key();
        }
        if self.unique {
            field = field.unique();
        }
        if self.choices {
            field = field.with_choices();
        }
        if self.reverse {
            field.is_relation = true;
            field.is_reverse_relation = true;
        }
        field
    }
}

/// A model handled through configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model label, `app.Model`
    #[serde(default)]
    pub model: String,

    /// Handler name shown in reports
    #[serde(default)]
    pub handler: Option<String>,

    /// Register a handler for this model; when false the model is only
    /// declared
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub auto_redact: bool,

    /// Fields never auto-redacted
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldConfig>,

    /// Custom redaction values per field
    #[serde(default)]
    pub custom: BTreeMap<String, ConfigValue>,
}

impl ModelConfig {
    fn validate(&self) -> Result<(), String> {
        let record_type = self.record_type()?;
        if self.fields.is_empty() {
            return Err(format!("Model '{record_type}' declares no fields"));
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(format!(
                    "Field '{}' declared more than once on '{record_type}'",
                    field.name
                ));
            }
        }

        for name in self.exclude.iter().chain(self.custom.keys()) {
            if !names.contains(name.as_str()) {
                return Err(format!("Unknown field '{name}' referenced on '{record_type}'"));
            }
        }
        for value in self.custom.values() {
            value.to_redaction_value()?;
        }
        Ok(())
    }

    /// Parse the model label
    pub fn record_type(&self) -> Result<RecordType, String> {
        if self.model.trim().is_empty() {
            return Err("Model configuration is missing 'model'".to_string());
        }
        self.model.parse()
    }

    /// Build the schema described by this entry
    pub fn schema(&self) -> Result<RecordSchema, String> {
        let schema = self
            .fields
            .iter()
            .fold(RecordSchema::new(self.record_type()?), |schema, field| {
                schema.field(field.to_descriptor())
            });
        Ok(schema)
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_fill_char() -> char {
    DEFAULT_FILL_CHAR
}

fn default_text_length() -> usize {
    DEFAULT_TEXT_LENGTH
}
