//! Record selections
//!
//! A selection is a predicate over the records of one type, the way an ORM
//! queryset is: it may match zero, one or many rows.

use crate::domain::FieldValue;
use crate::schema::Model;

/// One filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field = value`
    Eq(String, FieldValue),
    /// `field IN (values)`
    In(String, Vec<FieldValue>),
}

impl Condition {
    fn matches<R: Model + ?Sized>(&self, record: &R) -> bool {
        match self {
            Condition::Eq(field, value) => record.get(field).as_ref() == Some(value),
            Condition::In(field, values) => record
                .get(field)
                .map(|v| values.contains(&v))
                .unwrap_or(false),
        }
    }
}

/// Predicate selecting records
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    /// Every record
    #[default]
    All,
    /// No record at all (statically empty)
    None,
    /// Records matching every condition
    Filter(Vec<Condition>),
}

impl Selection {
    pub fn all() -> Self {
        Self::All
    }

    pub fn none() -> Self {
        Self::None
    }

    pub fn filter(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::Filter(vec![Condition::Eq(field.into(), value.into())])
    }

    pub fn filter_in<V: Into<FieldValue>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::Filter(vec![Condition::In(
            field.into(),
            values.into_iter().map(Into::into).collect(),
        )])
    }

    /// Narrows the selection with an extra `field = value` condition
    pub fn and(self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let condition = Condition::Eq(field.into(), value.into());
        match self {
            Self::All => Self::Filter(vec![condition]),
            Self::None => Self::None,
            Self::Filter(mut conditions) => {
                conditions.push(condition);
                Self::Filter(conditions)
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn matches<R: Model + ?Sized>(&self, record: &R) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Filter(conditions) => conditions.iter().all(|c| c.matches(record)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StorageError;

    struct Row(i64, &'static str);

    impl Model for Row {
        fn get(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.0.into()),
                "name" => Some(self.1.into()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, _value: FieldValue) -> Result<(), StorageError> {
            Err(StorageError::UnknownField(field.to_string()))
        }
    }

    #[test]
    fn test_all_and_none() {
        let row = Row(1, "fred");
        assert!(Selection::all().matches(&row));
        assert!(!Selection::none().matches(&row));
    }

    #[test]
    fn test_filter_conditions() {
        let row = Row(1, "fred");
        assert!(Selection::filter("name", "fred").matches(&row));
        assert!(!Selection::filter("name", "ginger").matches(&row));
        assert!(Selection::filter_in("id", [1i64, 2]).matches(&row));
        assert!(!Selection::filter("name", "fred").and("id", 2i64).matches(&row));
        assert!(!Selection::filter("missing", "x").matches(&row));
    }

    #[test]
    fn test_and_on_none_stays_none() {
        assert!(Selection::none().and("id", 1i64).is_none());
    }
}
