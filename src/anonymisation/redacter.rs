//! Set-level redaction
//!
//! A [`FieldRedacter`] computes one replacement value per field and applies
//! all of them to a selection of records with a single set-based update.
//! Values are layered in three tiers, each overwriting the previous one for
//! the fields it names:
//!
//! 1. automatic values from the [`AutoRedacters`] table (if enabled)
//! 2. the handler's custom field redactions
//! 3. overrides passed to [`FieldRedacter::redact_selection`]

use super::classifier::{self, AutoRedacters};
use super::handler::Handler;
use crate::adapters::storage::{RecordStore, Selection};
use crate::domain::{RedactionValue, RedactionValues, Result};
use crate::schema::FieldDescriptor;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// How a field is treated by a set-level redaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedactionStrategy {
    Auto,
    Custom,
    None,
}

impl fmt::Display for RedactionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("AUTO"),
            Self::Custom => f.write_str("CUSTOM"),
            Self::None => Ok(()),
        }
    }
}

/// Per-call options for [`FieldRedacter::redact_selection`]
#[derive(Debug, Clone, Default)]
pub struct RedactOptions {
    /// Overrides the handler's auto-redact toggle for this call
    pub auto_redact: Option<bool>,
    /// Highest-precedence values, applied after auto and custom values
    pub field_overrides: RedactionValues,
}

impl RedactOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_redact(mut self, enabled: bool) -> Self {
        self.auto_redact = Some(enabled);
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<RedactionValue>) -> Self {
        self.field_overrides.insert(field, value);
        self
    }
}

/// Set-level redaction capability
pub trait FieldRedacter: Handler {
    /// Whether eligible fields are redacted automatically
    fn auto_redact(&self) -> bool {
        true
    }

    /// Fields never auto-redacted, whatever their type
    fn auto_redact_exclude(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Handler-level custom values, applied over the automatic ones
    fn custom_field_redactions(&self) -> RedactionValues {
        RedactionValues::new()
    }

    /// Generator table used for automatic values
    fn auto_redacters(&self) -> AutoRedacters {
        AutoRedacters::default()
    }

    /// Flag-level check: relation, primary key, unique and choice fields
    /// are never auto-redacted
    fn is_field_redactable(&self, field: &FieldDescriptor) -> bool {
        classifier::is_redactable(field)
    }

    /// True if `field` would get an automatic value when auto-redact is on
    fn is_field_auto_redactable(&self, field: &FieldDescriptor, table: &AutoRedacters) -> bool {
        self.is_field_redactable(field)
            && classifier::is_eligible_for_auto_redaction(field, &self.auto_redact_exclude(), table)
    }

    /// Automatic value for a single field, `None` while auto-redact is off
    fn field_auto_redacter(&self, field: &FieldDescriptor) -> Option<RedactionValue> {
        if !self.auto_redact() {
            return None;
        }
        let table = self.auto_redacters();
        if !self.is_field_auto_redactable(field, &table) {
            return None;
        }
        table.generate(field)
    }

    /// Automatic values for all eligible fields, honouring the toggle
    fn auto_redaction_values(&self) -> RedactionValues {
        if self.auto_redact() {
            collect_auto_values(self)
        } else {
            RedactionValues::new()
        }
    }

    /// Automatic values overlaid with the custom ones
    fn field_redaction_values(&self) -> RedactionValues {
        let mut values = self.auto_redaction_values();
        values.merge(self.custom_field_redactions());
        values
    }

    /// Strategy for `field`: custom beats auto
    fn field_redaction_strategy(&self, field: &FieldDescriptor) -> RedactionStrategy {
        if self.custom_field_redactions().contains(&field.name) {
            return RedactionStrategy::Custom;
        }
        if self.auto_redact() && self.is_field_auto_redactable(field, &self.auto_redacters()) {
            return RedactionStrategy::Auto;
        }
        RedactionStrategy::None
    }

    /// Values a call with `options` would apply, layered auto, custom, overrides
    fn resolve_redaction_values(&self, options: &RedactOptions) -> RedactionValues {
        let mut values = if options.auto_redact.unwrap_or_else(|| self.auto_redact()) {
            collect_auto_values(self)
        } else {
            RedactionValues::new()
        };
        values.merge(self.custom_field_redactions());
        values.merge(options.field_overrides.clone());
        values
    }

    /// Redact every record in the selection with one set-based update
    ///
    /// Returns the number of records affected. An empty selection returns 0
    /// without generating any values, and so does an empty value map.
    ///
    /// # Errors
    ///
    /// Storage errors are returned unchanged; no record is modified.
    fn redact_selection(
        &self,
        store: &mut dyn RecordStore<Self::Record>,
        selection: &Selection,
        options: RedactOptions,
    ) -> Result<usize> {
        let record_type = self.record_type();
        if selection.is_none() || store.count(selection)? == 0 {
            debug!(record_type = %record_type, "Nothing to redact");
            return Ok(0);
        }

        let auto_redact = options.auto_redact.unwrap_or_else(|| self.auto_redact());
        let values = self.resolve_redaction_values(&options);

        if values.is_empty() {
            warn!(handler = %self.name(), "No fields to redact");
            return Ok(0);
        }
        debug!(
            handler = %self.name(),
            fields = ?values.fields().collect::<Vec<_>>(),
            "Applying redaction"
        );

        let count = store.update(selection, &values)?;
        crate::log_selection_processed!("redact", record_type, count);
        info!(handler = %self.name(), auto_redact, "Redaction complete");
        Ok(count)
    }
}

fn collect_auto_values<H: FieldRedacter + ?Sized>(handler: &H) -> RedactionValues {
    let table = handler.auto_redacters();
    let now = table.now();
    let mut values = RedactionValues::new();
    for field in handler.model_fields() {
        if !handler.is_field_auto_redactable(&field, &table) {
            continue;
        }
        if let Some(value) = table.generate_at(&field, now) {
            values.insert(field.name, value);
        }
    }
    values
}
