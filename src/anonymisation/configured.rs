//! Handlers described by configuration
//!
//! A `[[models]]` entry declares a schema and its redaction settings. The
//! resulting [`ConfiguredHandler`] works on [`DynamicRecord`]s and has no
//! custom anonymise functions.

use super::anonymiser::{CustomAnonymiser, FieldAnonymiser};
use super::classifier::AutoRedacters;
use super::handler::Handler;
use super::redacter::FieldRedacter;
use super::registry::Registry;
use crate::adapters::dynamic::DynamicRecord;
use crate::config::{AnonymiserConfig, ModelConfig};
use crate::domain::{AnonymiserError, RedactionValues, Result};
use crate::schema::RecordSchema;
use std::sync::Arc;
use tracing::info;

/// Redacter built from a `[[models]]` config entry
#[derive(Debug, Clone)]
pub struct ConfiguredHandler {
    name: String,
    schema: Arc<RecordSchema>,
    auto_redact: bool,
    exclude: Vec<String>,
    custom: RedactionValues,
    auto_redacters: AutoRedacters,
}

impl ConfiguredHandler {
    /// Build a handler from a model entry and the generator table
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the entry has no model label or an
    /// invalid custom value.
    pub fn from_config(config: &ModelConfig, auto_redacters: AutoRedacters) -> Result<Self> {
        let schema = config.schema().map_err(AnonymiserError::Configuration)?;
        schema.validate()?;

        let mut custom = RedactionValues::new();
        for (field, value) in &config.custom {
            let value = value.to_redaction_value().map_err(|e| {
                AnonymiserError::Configuration(format!(
                    "Invalid custom value for {}.{field}: {e}",
                    config.model
                ))
            })?;
            custom.insert(field.clone(), value);
        }

        Ok(Self {
            name: config
                .handler
                .clone()
                .unwrap_or_else(|| "ConfiguredRedacter".to_string()),
            schema: Arc::new(schema),
            auto_redact: config.auto_redact,
            exclude: config.exclude.clone(),
            custom,
            auto_redacters,
        })
    }

    /// Shared schema, for building records
    pub fn shared_schema(&self) -> Arc<RecordSchema> {
        Arc::clone(&self.schema)
    }
}

impl Handler for ConfiguredHandler {
    type Record = DynamicRecord;

    fn schema(&self) -> RecordSchema {
        self.schema.as_ref().clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

impl FieldAnonymiser for ConfiguredHandler {
    const FIELD_ANONYMISERS: &'static [CustomAnonymiser<Self>] = &[];
}

impl FieldRedacter for ConfiguredHandler {
    fn auto_redact(&self) -> bool {
        self.auto_redact
    }

    fn auto_redact_exclude(&self) -> Vec<&str> {
        self.exclude.iter().map(String::as_str).collect()
    }

    fn custom_field_redactions(&self) -> RedactionValues {
        self.custom.clone()
    }

    fn auto_redacters(&self) -> AutoRedacters {
        self.auto_redacters.clone()
    }
}

/// Register every configured model
///
/// Enabled models get a [`ConfiguredHandler`] registered as a redacter;
/// disabled ones are only declared. Returns the number of handlers
/// registered.
///
/// # Errors
///
/// Returns the first registration or configuration error.
pub fn register_configured_models(registry: &Registry, config: &AnonymiserConfig) -> Result<usize> {
    let auto_redacters = AutoRedacters::from_config(&config.auto_redact)?;
    let mut registered = 0;

    for model in &config.models {
        let handler = ConfiguredHandler::from_config(model, auto_redacters.clone())?;
        if model.enabled {
            registry.register_redacter(move || handler.clone())?;
            registered += 1;
        } else {
            registry.declare_schema(handler.schema())?;
        }
    }

    info!(
        registered,
        declared = config.models.len() - registered,
        "Configured models loaded"
    );
    Ok(registered)
}

/// Build a registry holding every configured model
pub fn registry_from_config(config: &AnonymiserConfig) -> Result<Registry> {
    let registry = Registry::new();
    register_configured_models(&registry, config)?;
    Ok(registry)
}
