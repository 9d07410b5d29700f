//! Record type identifier
//!
//! A record type is named the way the ORM labels it: `app_label.ModelName`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record type newtype
///
/// Ordered by label so registry enumeration is stable. The default value has
/// empty parts and stands for "no record type set".
///
/// # Examples
///
/// ```
/// use anonymiser::domain::RecordType;
/// use std::str::FromStr;
///
/// let record_type = RecordType::from_str("tests.User").unwrap();
/// assert_eq!(record_type.app_label(), "tests");
/// assert_eq!(record_type.model_name(), "User");
/// assert_eq!(record_type.label(), "tests.User");
/// ```
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RecordType {
    app_label: String,
    model_name: String,
}

impl RecordType {
    /// Creates a record type from its app label and model name
    pub fn new(app_label: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            model_name: model_name.into(),
        }
    }

    /// Returns the application label
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    /// Returns the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns `app_label.ModelName`
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// True when either part is blank
    pub fn is_unset(&self) -> bool {
        self.app_label.trim().is_empty() || self.model_name.trim().is_empty()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model_name)
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('.') {
            Some((app, model))
                if !app.is_empty() && !model.is_empty() && !model.contains('.') =>
            {
                Ok(Self::new(app, model))
            }
            _ => Err(format!(
                "Invalid record type '{s}'. Expected format: app_label.ModelName"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_type() {
        let rt: RecordType = "tests.User".parse().unwrap();
        assert_eq!(rt, RecordType::new("tests", "User"));
        assert_eq!(rt.to_string(), "tests.User");
    }

    #[test]
    fn test_parse_invalid_record_type() {
        assert!("User".parse::<RecordType>().is_err());
        assert!(".User".parse::<RecordType>().is_err());
        assert!("tests.".parse::<RecordType>().is_err());
        assert!("a.b.c".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_default_is_unset() {
        assert!(RecordType::default().is_unset());
        assert!(!RecordType::new("tests", "User").is_unset());
    }

    #[test]
    fn test_ordering_is_by_label() {
        let mut types = vec![
            RecordType::new("tests", "User"),
            RecordType::new("auth", "Group"),
            RecordType::new("tests", "Address"),
        ];
        types.sort();
        let labels: Vec<_> = types.iter().map(RecordType::label).collect();
        assert_eq!(labels, vec!["auth.Group", "tests.Address", "tests.User"]);
    }
}
