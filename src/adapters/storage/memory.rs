//! In-memory record store
//!
//! Reference implementation of [`RecordStore`] used by the CLI and the test
//! suites. It behaves like a single table: primary-key upserts on save,
//! unique constraints on save and update, and per-row evaluation of
//! expressions during set-based updates.

use super::selection::Selection;
use super::traits::RecordStore;
use crate::domain::{Expression, FieldValue, RedactionValue, RedactionValues, StorageError};
use crate::schema::{FieldType, Model, RecordSchema};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Rendered value to row position
type ValueIndex = HashMap<String, usize>;

/// Single-table in-memory store
///
/// Unique and primary-key values are indexed so `insert` and `save` run in
/// constant time per record. `update` rebuilds the indexes.
#[derive(Debug, Clone)]
pub struct MemoryStore<R> {
    schema: RecordSchema,
    rows: Vec<R>,
    unique: HashMap<String, ValueIndex>,
    by_pk: ValueIndex,
    saves: usize,
    updates: usize,
    fail_saves_after: Option<usize>,
}

impl<R: Model + Clone> MemoryStore<R> {
    /// Create an empty store for the given schema
    pub fn new(schema: RecordSchema) -> Self {
        let unique = schema
            .fields()
            .iter()
            .filter(|f| f.is_unique)
            .map(|f| (f.name.clone(), ValueIndex::new()))
            .collect();
        Self {
            schema,
            rows: Vec::new(),
            unique,
            by_pk: ValueIndex::new(),
            saves: 0,
            updates: 0,
            fail_saves_after: None,
        }
    }

    /// Insert a new record, enforcing unique constraints
    ///
    /// Inserts are not counted as saves.
    pub fn insert(&mut self, record: R) -> Result<(), StorageError> {
        self.check_unique_row(&record, None)?;
        self.rows.push(record);
        self.index_row(self.rows.len() - 1);
        Ok(())
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    /// Find the stored record with `field = value`
    pub fn find(&self, field: &str, value: &FieldValue) -> Option<&R> {
        self.rows
            .iter()
            .find(|r| r.get(field).as_ref() == Some(value))
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Number of successful `update` calls
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Make every `save` after the first `n` successful ones fail
    pub fn fail_saves_after(&mut self, n: usize) {
        self.fail_saves_after = Some(n);
    }

    fn primary_key_of(&self, record: &R) -> Result<FieldValue, StorageError> {
        let pk = self.schema.primary_key().ok_or_else(|| {
            StorageError::Backend(format!(
                "{} has no primary key field",
                self.schema.record_type()
            ))
        })?;
        record
            .get(&pk.name)
            .ok_or_else(|| StorageError::UnknownField(pk.name.clone()))
    }

    /// Non-null unique values of `record` as `(field, rendered value)`
    fn unique_keys(&self, record: &R) -> Vec<(String, String)> {
        self.unique
            .keys()
            .filter_map(|field| {
                let value = record.get(field)?;
                (!value.is_null()).then(|| (field.clone(), value.to_string()))
            })
            .collect()
    }

    /// Check `record` against the index, ignoring the row it would replace
    fn check_unique_row(&self, record: &R, replacing: Option<usize>) -> Result<(), StorageError> {
        for (field, key) in self.unique_keys(record) {
            let taken = self.unique.get(&field).and_then(|index| index.get(&key));
            if let Some(&position) = taken {
                if Some(position) != replacing {
                    return Err(StorageError::UniqueViolation { field, value: key });
                }
            }
        }
        Ok(())
    }

    fn index_row(&mut self, position: usize) {
        let record = &self.rows[position];
        let keys = self.unique_keys(record);
        let pk = self
            .schema
            .primary_key()
            .and_then(|pk| record.get(&pk.name))
            .filter(|value| !value.is_null());
        for (field, key) in keys {
            if let Some(index) = self.unique.get_mut(&field) {
                index.insert(key, position);
            }
        }
        if let Some(pk) = pk {
            self.by_pk.entry(pk.to_string()).or_insert(position);
        }
    }

    fn unindex_row(&mut self, position: usize) {
        for (field, key) in self.unique_keys(&self.rows[position]) {
            if let Some(index) = self.unique.get_mut(&field) {
                if index.get(&key) == Some(&position) {
                    index.remove(&key);
                }
            }
        }
    }

    fn rebuild_indexes(&mut self) {
        for index in self.unique.values_mut() {
            index.clear();
        }
        self.by_pk.clear();
        for position in 0..self.rows.len() {
            self.index_row(position);
        }
    }

    fn check_unique(&self, rows: &[R]) -> Result<(), StorageError> {
        for field in self.unique.keys() {
            let mut seen = HashSet::new();
            for row in rows {
                let Some(value) = row.get(field) else {
                    continue;
                };
                if value.is_null() {
                    continue;
                }
                let key = value.to_string();
                if !seen.insert(key.clone()) {
                    return Err(StorageError::UniqueViolation {
                        field: field.clone(),
                        value: key,
                    });
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, value: &RedactionValue, row: &R) -> Result<FieldValue, StorageError> {
        match value {
            RedactionValue::Literal(v) => Ok(v.clone()),
            RedactionValue::Expression(Expression::GenerateUuid4) => {
                Ok(FieldValue::Uuid(Uuid::new_v4()))
            }
            RedactionValue::Expression(Expression::Field(name)) => row
                .get(name)
                .ok_or_else(|| StorageError::UnknownField(name.clone())),
            RedactionValue::Expression(Expression::Concat(parts)) => {
                let mut out = String::new();
                for part in parts {
                    match self.evaluate(part, row)? {
                        FieldValue::Null => {}
                        other => out.push_str(&other.to_string()),
                    }
                }
                Ok(FieldValue::Text(out))
            }
        }
    }

    fn check_fields(&self, values: &RedactionValues) -> Result<(), StorageError> {
        for field in values.fields() {
            match self.schema.get_field(field) {
                Some(f) if f.is_reverse_relation => {
                    return Err(StorageError::Unsupported(format!(
                        "cannot update reverse relation '{field}'"
                    )))
                }
                Some(f) if f.field_type == FieldType::ManyToMany => {
                    return Err(StorageError::Unsupported(format!(
                        "cannot update many-to-many field '{field}'"
                    )))
                }
                Some(_) => {}
                None => return Err(StorageError::UnknownField(field.to_string())),
            }
        }
        Ok(())
    }
}

impl<R: Model + Clone> RecordStore<R> for MemoryStore<R> {
    fn fetch(&self, selection: &Selection) -> Result<Vec<R>, StorageError> {
        Ok(self
            .rows
            .iter()
            .filter(|r| selection.matches(*r))
            .cloned()
            .collect())
    }

    fn count(&self, selection: &Selection) -> Result<usize, StorageError> {
        Ok(self.rows.iter().filter(|r| selection.matches(*r)).count())
    }

    fn save(&mut self, record: &R) -> Result<(), StorageError> {
        if let Some(limit) = self.fail_saves_after {
            if self.saves >= limit {
                return Err(StorageError::Backend(format!(
                    "save rejected after {limit} records"
                )));
            }
        }

        let pk = self.primary_key_of(record)?.to_string();
        let existing = self.by_pk.get(&pk).copied();
        self.check_unique_row(record, existing)?;
        match existing {
            Some(position) => {
                self.unindex_row(position);
                self.rows[position] = record.clone();
                self.index_row(position);
            }
            None => {
                self.rows.push(record.clone());
                self.index_row(self.rows.len() - 1);
            }
        }
        self.saves += 1;
        Ok(())
    }

    fn update(
        &mut self,
        selection: &Selection,
        values: &RedactionValues,
    ) -> Result<usize, StorageError> {
        self.check_fields(values)?;

        let mut candidate = self.rows.clone();
        let mut affected = 0;
        for row in candidate.iter_mut() {
            if !selection.matches(&*row) {
                continue;
            }
            // every expression sees the row as it was before this update
            let mut evaluated = Vec::with_capacity(values.len());
            for (field, value) in values {
                evaluated.push((field.as_str(), self.evaluate(value, row)?));
            }
            for (field, value) in evaluated {
                row.set(field, value)?;
            }
            affected += 1;
        }

        self.check_unique(&candidate)?;
        self.rows = candidate;
        self.rebuild_indexes();
        self.updates += 1;
        tracing::trace!(
            record_type = %self.schema.record_type(),
            affected,
            fields = values.len(),
            "In-memory update applied"
        );
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordType;
    use crate::schema::FieldDescriptor;

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        email: String,
        token: Option<Uuid>,
    }

    impl Model for Person {
        fn get(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.id.into()),
                "name" => Some(self.name.clone().into()),
                "email" => Some(self.email.clone().into()),
                "token" => Some(self.token.into()),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: FieldValue) -> Result<(), StorageError> {
            match (field, value) {
                ("name", FieldValue::Text(s)) => self.name = s,
                ("email", FieldValue::Text(s)) => self.email = s,
                ("token", FieldValue::Uuid(u)) => self.token = Some(u),
                ("token", FieldValue::Null) => self.token = None,
                ("id" | "name" | "email" | "token", _) => {
                    return Err(StorageError::TypeMismatch {
                        field: field.to_string(),
                        expected: "matching type".to_string(),
                    })
                }
                _ => return Err(StorageError::UnknownField(field.to_string())),
            }
            Ok(())
        }
    }

    fn person(id: i64, name: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
            email: format!("{name}@example.com"),
            token: None,
        }
    }

    fn store() -> MemoryStore<Person> {
        let schema = RecordSchema::new(RecordType::new("tests", "Person"))
            .field(FieldDescriptor::auto("id"))
            .field(FieldDescriptor::char("name", 50))
            .field(FieldDescriptor::char("email", 100).unique())
            .field(FieldDescriptor::uuid("token").unique());
        let mut store = MemoryStore::new(schema);
        store.insert(person(1, "fred")).unwrap();
        store.insert(person(2, "ginger")).unwrap();
        store
    }

    #[test]
    fn test_save_replaces_by_primary_key() {
        let mut store = store();
        let mut fred = store.fetch(&Selection::filter("id", 1i64)).unwrap().remove(0);
        fred.name = "Anonymous".to_string();
        store.save(&fred).unwrap();
        assert_eq!(store.rows().len(), 2);
        assert_eq!(store.find("id", &1i64.into()).unwrap().name, "Anonymous");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_save_enforces_unique() {
        let mut store = store();
        let mut ginger = person(2, "ginger");
        ginger.email = "fred@example.com".to_string();
        let err = store.save(&ginger).unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { .. }));
        assert_eq!(store.find("id", &2i64.into()).unwrap().email, "ginger@example.com");
    }

    #[test]
    fn test_update_generates_uuid_per_row() {
        let mut store = store();
        let values = RedactionValues::new().with("token", Expression::GenerateUuid4);
        assert_eq!(store.update(&Selection::all(), &values).unwrap(), 2);
        let tokens: Vec<_> = store.rows().iter().map(|p| p.token).collect();
        assert!(tokens.iter().all(Option::is_some));
        assert_ne!(tokens[0], tokens[1]);
    }

    #[test]
    fn test_update_evaluates_concat_against_row() {
        let mut store = store();
        let values = RedactionValues::new().with(
            "email",
            Expression::concat([
                RedactionValue::from("user_"),
                Expression::field("id").into(),
                RedactionValue::from("@example.com"),
            ]),
        );
        store.update(&Selection::all(), &values).unwrap();
        assert_eq!(store.find("id", &2i64.into()).unwrap().email, "user_2@example.com");
    }

    #[test]
    fn test_update_is_all_or_nothing_on_unique_violation() {
        let mut store = store();
        let values = RedactionValues::new().with("email", "same@example.com");
        let err = store.update(&Selection::all(), &values).unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation { .. }));
        assert_eq!(store.find("id", &1i64.into()).unwrap().email, "fred@example.com");
    }

    #[test]
    fn test_update_unknown_field() {
        let mut store = store();
        let values = RedactionValues::new().with("nickname", "x");
        assert_eq!(
            store.update(&Selection::all(), &values).unwrap_err(),
            StorageError::UnknownField("nickname".to_string())
        );
    }

    #[test]
    fn test_insert_rejects_duplicate_unique_value() {
        let mut store = store();
        let mut copy = person(3, "fred");
        copy.name = "freddy".to_string();
        let err = store.insert(copy).unwrap_err();
        assert_eq!(
            err,
            StorageError::UniqueViolation {
                field: "email".to_string(),
                value: "fred@example.com".to_string(),
            }
        );
        assert_eq!(store.rows().len(), 2);
    }

    #[test]
    fn test_save_releases_previous_unique_value() {
        let mut store = store();
        let mut fred = person(1, "fred");
        fred.email = "fred@bedrock.com".to_string();
        store.save(&fred).unwrap();

        // the old address is free again, the new one is taken
        store.insert(person(3, "fred")).unwrap();
        let mut ginger = person(2, "ginger");
        ginger.email = "fred@bedrock.com".to_string();
        assert!(store.save(&ginger).is_err());
        assert_eq!(store.rows().len(), 3);
    }

    #[test]
    fn test_save_after_update_uses_rebuilt_index() {
        let mut store = store();
        let values = RedactionValues::new().with(
            "email",
            Expression::concat([Expression::field("id").into(), RedactionValue::from("@x.org")]),
        );
        store.update(&Selection::all(), &values).unwrap();

        store.insert(person(3, "fred")).unwrap();
        let mut ginger = person(2, "ginger");
        ginger.email = "1@x.org".to_string();
        assert!(matches!(
            store.save(&ginger).unwrap_err(),
            StorageError::UniqueViolation { .. }
        ));
    }

    #[test]
    fn test_bulk_insert_and_save() {
        let mut store = store();
        for id in 3..50_000 {
            store.insert(person(id, &format!("user{id}"))).unwrap();
        }
        for id in 3..50_000 {
            let mut row = person(id, &format!("user{id}"));
            row.name = "Anonymous".to_string();
            store.save(&row).unwrap();
        }
        assert_eq!(store.rows().len(), 49_999);
        assert_eq!(store.save_count(), 49_997);
        assert!(store.rows()[2..].iter().all(|p| p.name == "Anonymous"));
    }

    #[test]
    fn test_injected_save_failure() {
        let mut store = store();
        store.fail_saves_after(1);
        store.save(&person(1, "fred")).unwrap();
        assert!(store.save(&person(2, "ginger")).is_err());
    }
}
