//! Field descriptors
//!
//! Read-only metadata about one field of a record type. The engines only read
//! these flags to classify fields; they never mutate them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type category of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldType {
    /// Bounded text (`max_length`)
    #[serde(rename = "CharField", alias = "char")]
    Char,
    /// Unbounded text
    #[serde(rename = "TextField", alias = "text")]
    Text,
    #[serde(rename = "DateField", alias = "date")]
    Date,
    #[serde(rename = "DateTimeField", alias = "datetime")]
    DateTime,
    /// Structured/JSON document
    #[serde(rename = "JSONField", alias = "json")]
    Json,
    #[serde(rename = "UUIDField", alias = "uuid")]
    Uuid,
    #[serde(rename = "IntegerField", alias = "integer")]
    Integer,
    #[serde(rename = "FloatField", alias = "float")]
    Float,
    #[serde(rename = "BooleanField", alias = "boolean")]
    Boolean,
    /// Auto-incrementing integer key
    #[serde(rename = "AutoField", alias = "auto")]
    Auto,
    #[serde(rename = "ForeignKey", alias = "foreign_key")]
    ForeignKey,
    #[serde(rename = "OneToOneField", alias = "one_to_one")]
    OneToOne,
    #[serde(rename = "ManyToManyField", alias = "many_to_many")]
    ManyToMany,
}

impl FieldType {
    /// All type categories, in declaration order
    pub const ALL: [FieldType; 13] = [
        Self::Char,
        Self::Text,
        Self::Date,
        Self::DateTime,
        Self::Json,
        Self::Uuid,
        Self::Integer,
        Self::Float,
        Self::Boolean,
        Self::Auto,
        Self::ForeignKey,
        Self::OneToOne,
        Self::ManyToMany,
    ];

    /// ORM class name of the field type
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Char => "CharField",
            Self::Text => "TextField",
            Self::Date => "DateField",
            Self::DateTime => "DateTimeField",
            Self::Json => "JSONField",
            Self::Uuid => "UUIDField",
            Self::Integer => "IntegerField",
            Self::Float => "FloatField",
            Self::Boolean => "BooleanField",
            Self::Auto => "AutoField",
            Self::ForeignKey => "ForeignKey",
            Self::OneToOne => "OneToOneField",
            Self::ManyToMany => "ManyToManyField",
        }
    }

    /// Short lowercase name, as accepted in configuration files
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Json => "json",
            Self::Uuid => "uuid",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Auto => "auto",
            Self::ForeignKey => "foreign_key",
            Self::OneToOne => "one_to_one",
            Self::ManyToMany => "many_to_many",
        }
    }

    /// True for relation type categories
    pub fn is_relation(&self) -> bool {
        matches!(self, Self::ForeignKey | Self::OneToOne | Self::ManyToMany)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.class_name() == s || t.short_name() == s.to_lowercase())
            .ok_or_else(|| format!("Unknown field type: {s}"))
    }
}

/// Metadata for one field of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Maximum length for bounded text
    pub max_length: Option<usize>,
    pub is_relation: bool,
    /// Reverse side of a relation; never a real column
    pub is_reverse_relation: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub has_choices: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            max_length: None,
            is_relation: field_type.is_relation(),
            is_reverse_relation: false,
            is_primary_key: false,
            is_unique: false,
            has_choices: false,
        }
    }

    pub fn char(name: impl Into<String>, max_length: usize) -> Self {
        Self::new(name, FieldType::Char).max_length(max_length)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Json)
    }

    pub fn uuid(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Uuid)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Auto-incrementing primary key
    pub fn auto(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Auto).primary_key()
    }

    pub fn foreign_key(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::ForeignKey)
    }

    /// Reverse-relation pseudo-field (e.g. `user.addresses`)
    pub fn reverse(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldType::ForeignKey);
        field.is_reverse_relation = true;
        field
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_unique = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn with_choices(mut self) -> Self {
        self.has_choices = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("CharField", FieldType::Char ; "class name")]
    #[test_case("char", FieldType::Char ; "short name")]
    #[test_case("DATETIME", FieldType::DateTime ; "case insensitive short name")]
    #[test_case("JSONField", FieldType::Json ; "json class name")]
    fn test_parse_field_type(input: &str, expected: FieldType) {
        assert_eq!(input.parse::<FieldType>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_field_type() {
        assert!("BinaryField".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_relation_flag_follows_type() {
        assert!(FieldDescriptor::foreign_key("group").is_relation);
        assert!(!FieldDescriptor::char("name", 10).is_relation);
    }

    #[test]
    fn test_primary_key_implies_unique() {
        let pk = FieldDescriptor::auto("id");
        assert!(pk.is_primary_key);
        assert!(pk.is_unique);
    }

    #[test]
    fn test_reverse_relation() {
        let field = FieldDescriptor::reverse("addresses");
        assert!(field.is_relation);
        assert!(field.is_reverse_relation);
    }
}
