//! Field values, redaction values and before/after snapshots

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A single field value as seen by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Json(serde_json::Value),
    Uuid(Uuid),
}

impl FieldValue {
    /// Returns the text content for `Text` values
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts to a JSON value (dates as ISO-8601 strings)
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.to_string()),
            Self::DateTime(dt) => Value::String(dt.to_rfc3339()),
            Self::Json(v) => v.clone(),
            Self::Uuid(u) => Value::String(u.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Json(v) => write!(f, "{v}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Storage-layer expression, evaluated per affected row
///
/// These are opaque to the engines: they are handed to the storage layer as
/// part of a single set-based update, so every row gets its own result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Storage-native random v4 UUID
    GenerateUuid4,
    /// Current value of another field on the same row
    Field(String),
    /// String concatenation of the parts
    Concat(Vec<RedactionValue>),
}

impl Expression {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn concat(parts: impl IntoIterator<Item = RedactionValue>) -> Self {
        Self::Concat(parts.into_iter().collect())
    }
}

/// Replacement value for a field in a set-based update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedactionValue {
    Literal(FieldValue),
    Expression(Expression),
}

impl RedactionValue {
    pub fn literal(value: impl Into<FieldValue>) -> Self {
        Self::Literal(value.into())
    }

    pub fn as_literal(&self) -> Option<&FieldValue> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Expression(_) => None,
        }
    }
}

impl From<FieldValue> for RedactionValue {
    fn from(value: FieldValue) -> Self {
        Self::Literal(value)
    }
}

impl From<Expression> for RedactionValue {
    fn from(value: Expression) -> Self {
        Self::Expression(value)
    }
}

impl From<&str> for RedactionValue {
    fn from(value: &str) -> Self {
        Self::Literal(value.into())
    }
}

impl From<String> for RedactionValue {
    fn from(value: String) -> Self {
        Self::Literal(value.into())
    }
}

/// Field name → replacement value, built per redaction call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedactionValues(BTreeMap<String, RedactionValue>);

impl RedactionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style
    pub fn with(mut self, field: impl Into<String>, value: impl Into<RedactionValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<RedactionValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Overwrites existing entries with the entries of `other`
    pub fn merge(&mut self, other: RedactionValues) {
        self.0.extend(other.0);
    }

    pub fn get(&self, field: &str) -> Option<&RedactionValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RedactionValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<RedactionValue>> FromIterator<(K, V)> for RedactionValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a RedactionValues {
    type Item = (&'a String, &'a RedactionValue);
    type IntoIter = btree_map::Iter<'a, String, RedactionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Before/after snapshot of one anonymised field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub old: Option<FieldValue>,
    pub new: Option<FieldValue>,
}

impl FieldUpdate {
    pub fn new(old: Option<FieldValue>, new: Option<FieldValue>) -> Self {
        Self { old, new }
    }

    /// True when the custom function left the value unchanged
    pub fn is_unchanged(&self) -> bool {
        self.old == self.new
    }
}

/// Field name → before/after snapshot, handed to the post-anonymise hook
pub type FieldUpdates = BTreeMap<String, FieldUpdate>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overwrites() {
        let mut base = RedactionValues::new()
            .with("first_name", "AUTO")
            .with("bio", "XXXX");
        base.merge(RedactionValues::new().with("first_name", "CUSTOM"));
        assert_eq!(base.get("first_name"), Some(&RedactionValue::from("CUSTOM")));
        assert_eq!(base.get("bio"), Some(&RedactionValue::from("XXXX")));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_option_into_field_value() {
        let none: Option<String> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(
            FieldValue::from(Some("fred")),
            FieldValue::Text("fred".to_string())
        );
    }

    #[test]
    fn test_field_value_to_json() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(
            FieldValue::Date(date).to_json(),
            serde_json::json!("2021-01-01")
        );
        assert_eq!(FieldValue::Integer(7).to_json(), serde_json::json!(7));
    }

    #[test]
    fn test_field_update_unchanged() {
        let update = FieldUpdate::new(Some("a".into()), Some("a".into()));
        assert!(update.is_unchanged());
    }
}
