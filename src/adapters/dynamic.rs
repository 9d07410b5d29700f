//! JSON-backed records
//!
//! [`DynamicRecord`] is a [`Model`] whose shape is only known at runtime: a
//! JSON object checked against a [`RecordSchema`]. Config-driven handlers and
//! the CLI work on these.

use crate::domain::{AnonymiserError, FieldValue, Result, StorageError};
use crate::schema::{FieldType, Model, RecordSchema};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Record backed by a JSON object
#[derive(Debug, Clone)]
pub struct DynamicRecord {
    schema: Arc<RecordSchema>,
    values: Map<String, Value>,
}

impl DynamicRecord {
    /// Build a record from a JSON object
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object or carries keys that the
    /// schema does not declare.
    pub fn from_json(schema: Arc<RecordSchema>, value: Value) -> Result<Self> {
        let Value::Object(values) = value else {
            return Err(AnonymiserError::Serialization(format!(
                "Expected a JSON object for {}",
                schema.record_type()
            )));
        };
        if let Some(unknown) = values.keys().find(|k| schema.get_field(k).is_none()) {
            return Err(AnonymiserError::UnknownField {
                record_type: schema.record_type().label(),
                field: unknown.clone(),
            });
        }
        Ok(Self { schema, values })
    }

    /// Parse a JSON array of objects
    pub fn many_from_json(schema: Arc<RecordSchema>, value: Value) -> Result<Vec<Self>> {
        let Value::Array(items) = value else {
            return Err(AnonymiserError::Serialization(
                "Expected a JSON array of records".to_string(),
            ));
        };
        items
            .into_iter()
            .map(|item| Self::from_json(Arc::clone(&schema), item))
            .collect()
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

fn to_field_value(field_type: FieldType, value: &Value) -> FieldValue {
    match (field_type, value) {
        (_, Value::Null) => FieldValue::Null,
        (FieldType::Json, v) => FieldValue::Json(v.clone()),
        (FieldType::Uuid, Value::String(s)) => s
            .parse()
            .map(FieldValue::Uuid)
            .unwrap_or_else(|_| FieldValue::Text(s.clone())),
        (FieldType::Date, Value::String(s)) => s
            .parse::<NaiveDate>()
            .map(FieldValue::Date)
            .unwrap_or_else(|_| FieldValue::Text(s.clone())),
        (FieldType::DateTime, Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
            .unwrap_or_else(|_| FieldValue::Text(s.clone())),
        (_, Value::Bool(b)) => FieldValue::Bool(*b),
        (_, Value::Number(n)) => n
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| n.as_f64().map(FieldValue::Float))
            .unwrap_or(FieldValue::Null),
        (_, Value::String(s)) => FieldValue::Text(s.clone()),
        (_, other) => FieldValue::Json(other.clone()),
    }
}

impl Model for DynamicRecord {
    fn get(&self, field: &str) -> Option<FieldValue> {
        let descriptor = self.schema.get_field(field)?;
        Some(
            self.values
                .get(field)
                .map(|v| to_field_value(descriptor.field_type, v))
                .unwrap_or(FieldValue::Null),
        )
    }

    fn set(&mut self, field: &str, value: FieldValue) -> std::result::Result<(), StorageError> {
        if self.schema.get_field(field).is_none() {
            return Err(StorageError::UnknownField(field.to_string()));
        }
        self.values.insert(field.to_string(), value.to_json());
        Ok(())
    }
}
