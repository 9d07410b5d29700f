//! Record schemas and the model access trait

use super::field::FieldDescriptor;
use crate::domain::{AnonymiserError, FieldValue, RecordType, Result, StorageError};
use std::collections::HashSet;

/// Schema of one record type: its identifier and ordered fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSchema {
    record_type: RecordType,
    fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            fields: Vec::new(),
        }
    }

    /// Appends a field, builder style
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// All fields, including reverse-relation pseudo-fields
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Fields backed by real storage (reverse relations removed)
    pub fn concrete_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| !f.is_reverse_relation)
            .collect()
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    /// Checks the record type is set and field names are unique
    pub fn validate(&self) -> Result<()> {
        if self.record_type.is_unset() {
            return Err(AnonymiserError::Configuration(
                "Record schema must have a record type set".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(AnonymiserError::Configuration(format!(
                    "Duplicate field '{}' on {}",
                    field.name, self.record_type
                )));
            }
        }
        Ok(())
    }
}

/// Name-based access to a live record instance
///
/// Typed records keep their ordinary struct fields; this trait is what lets
/// the engines snapshot values and the storage layer apply set-based updates.
///
/// ```
/// use anonymiser::domain::{FieldValue, StorageError};
/// use anonymiser::schema::Model;
///
/// #[derive(Clone)]
/// struct Tag {
///     label: String,
/// }
///
/// impl Model for Tag {
///     fn get(&self, field: &str) -> Option<FieldValue> {
///         match field {
///             "label" => Some(self.label.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, field: &str, value: FieldValue) -> Result<(), StorageError> {
///         match (field, value) {
///             ("label", FieldValue::Text(s)) => self.label = s,
///             ("label", _) => {
///                 return Err(StorageError::TypeMismatch {
///                     field: field.to_string(),
///                     expected: "text".to_string(),
///                 })
///             }
///             _ => return Err(StorageError::UnknownField(field.to_string())),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Model: Send + Sync + 'static {
    /// Current value of `field`, `None` if the record has no such field
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Overwrites `field` with `value`
    fn set(&mut self, field: &str, value: FieldValue) -> std::result::Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn user_schema() -> RecordSchema {
        RecordSchema::new(RecordType::new("tests", "User"))
            .field(FieldDescriptor::auto("id"))
            .field(FieldDescriptor::char("first_name", 150))
            .field(FieldDescriptor::reverse("addresses"))
    }

    #[test]
    fn test_concrete_fields_skip_reverse_relations() {
        let schema = user_schema();
        let names: Vec<_> = schema.concrete_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "first_name"]);
        assert_eq!(schema.fields().len(), 3);
    }

    #[test]
    fn test_primary_key_lookup() {
        let schema = user_schema();
        assert_eq!(schema.primary_key().unwrap().field_type, FieldType::Auto);
    }

    #[test]
    fn test_validate_requires_record_type() {
        let schema = RecordSchema::default().field(FieldDescriptor::text("bio"));
        assert!(matches!(
            schema.validate(),
            Err(AnonymiserError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_fields() {
        let schema = user_schema().field(FieldDescriptor::text("first_name"));
        assert!(schema.validate().is_err());
    }
}
