//! Field-by-field summaries of registered handlers
//!
//! Combines registry and classifier output into plain data for documentation
//! and the `describe` command. Nothing here has side effects.

use super::redacter::RedactionStrategy;
use super::registry::Registry;
use crate::schema::RecordSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// One row of a model summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    /// Application label of the record type
    pub app: String,

    /// Model name of the record type
    pub model: String,

    /// `app.Model` label
    pub label: String,

    pub field_name: String,

    /// Field type class name, e.g. `CharField`
    pub field_type: String,

    /// Name of the registered handler, if any
    pub handler: Option<String>,

    /// True if the handler has a custom anonymise function for this field
    pub is_anonymised: bool,

    pub redaction_strategy: RedactionStrategy,
}

/// Model label with the name of its handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelAnonymiserSummary {
    pub model: String,
    pub anonymiser: Option<String>,
}

/// Summarise every field of `schema`
///
/// Rows are sorted by (app, model, field type, field name).
pub fn describe(registry: &Registry, schema: &RecordSchema) -> Vec<FieldSummary> {
    let record_type = schema.record_type();
    let handler = registry.lookup(record_type);

    let mut rows: Vec<FieldSummary> = schema
        .fields()
        .iter()
        .map(|field| FieldSummary {
            app: record_type.app_label().to_string(),
            model: record_type.model_name().to_string(),
            label: record_type.label(),
            field_name: field.name.clone(),
            field_type: field.field_type.class_name().to_string(),
            handler: handler.as_ref().map(|h| h.name()),
            is_anonymised: handler
                .as_ref()
                .is_some_and(|h| h.is_field_anonymised(&field.name)),
            redaction_strategy: handler
                .as_ref()
                .map_or(RedactionStrategy::None, |h| h.field_redaction_strategy(field)),
        })
        .collect();

    rows.sort_by(|a, b| {
        (&a.app, &a.model, &a.field_type, &a.field_name).cmp(&(
            &b.app,
            &b.model,
            &b.field_type,
            &b.field_name,
        ))
    });
    rows
}

/// Summaries for every known schema, keyed by model label
///
/// With `anonymised_only`, models without a handler are skipped.
pub fn all_model_fields(registry: &Registry, anonymised_only: bool) -> BTreeMap<String, Vec<FieldSummary>> {
    registry
        .schemas()
        .iter()
        .filter(|schema| !anonymised_only || registry.is_anonymisable(schema.record_type()))
        .map(|schema| (schema.record_type().label(), describe(registry, schema)))
        .collect()
}

/// Every known model with the name of its handler
pub fn model_anonymisers(registry: &Registry) -> Vec<ModelAnonymiserSummary> {
    registry
        .schemas()
        .iter()
        .map(|schema| ModelAnonymiserSummary {
            model: schema.record_type().label(),
            anonymiser: registry.handler_name(schema.record_type()),
        })
        .collect()
}

/// Render summaries as a markdown table
pub fn format_markdown(rows: &[FieldSummary]) -> String {
    let mut output = String::new();
    output.push_str("| app | model | field | type | anonymised | redaction |\n");
    output.push_str("|-----|-------|-------|------|------------|-----------|\n");
    for row in rows {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            row.app,
            row.model,
            row.field_name,
            row.field_type,
            if row.is_anonymised { "yes" } else { "" },
            row.redaction_strategy,
        ));
    }
    output
}

/// Render the model → handler overview for console output
pub fn format_console(summaries: &[ModelAnonymiserSummary]) -> String {
    let width = summaries.iter().map(|s| s.model.len()).max().unwrap_or(0);
    let mut output = String::new();
    for summary in summaries {
        output.push_str(&format!(
            "  {:<width$}  {}\n",
            summary.model,
            summary.anonymiser.as_deref().unwrap_or("-"),
        ));
    }
    output
}
