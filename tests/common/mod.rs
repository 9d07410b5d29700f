//! Shared fixtures for integration tests

#![allow(dead_code)]

use anonymiser::adapters::storage::MemoryStore;
use anonymiser::anonymisation::{
    AutoRedacters, CustomAnonymiser, FieldAnonymiser, FieldRedacter, Handler,
};
use anonymiser::domain::{FieldUpdates, FieldValue, RecordType, RedactionValues, StorageError};
use anonymiser::schema::{FieldDescriptor, Model, RecordSchema};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub biography: String,
    pub uuid: Uuid,
    pub date_of_birth: Option<NaiveDate>,
}

impl User {
    pub fn new(id: i64, first_name: &str, last_name: &str) -> Self {
        Self {
            id,
            username: format!("{first_name}.{last_name}"),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            location: "Bedrock".to_string(),
            biography: format!("{first_name} lives in Bedrock"),
            uuid: Uuid::new_v4(),
            date_of_birth: NaiveDate::from_ymd_opt(1960, 9, 30),
        }
    }
}

impl Model for User {
    fn get(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "username" => Some(self.username.clone().into()),
            "first_name" => Some(self.first_name.clone().into()),
            "last_name" => Some(self.last_name.clone().into()),
            "location" => Some(self.location.clone().into()),
            "biography" => Some(self.biography.clone().into()),
            "uuid" => Some(self.uuid.into()),
            "date_of_birth" => Some(self.date_of_birth.into()),
            _ => None,
        }
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), StorageError> {
        let mismatch = |expected: &str| StorageError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
        };
        match field {
            "username" => self.username = value.as_text().ok_or_else(|| mismatch("text"))?.to_string(),
            "first_name" => self.first_name = value.as_text().ok_or_else(|| mismatch("text"))?.to_string(),
            "last_name" => self.last_name = value.as_text().ok_or_else(|| mismatch("text"))?.to_string(),
            "location" => self.location = value.as_text().ok_or_else(|| mismatch("text"))?.to_string(),
            "biography" => self.biography = value.as_text().ok_or_else(|| mismatch("text"))?.to_string(),
            "uuid" => match value {
                FieldValue::Uuid(u) => self.uuid = u,
                _ => return Err(mismatch("uuid")),
            },
            "date_of_birth" => match value {
                FieldValue::Date(d) => self.date_of_birth = Some(d),
                FieldValue::Null => self.date_of_birth = None,
                _ => return Err(mismatch("date")),
            },
            _ => return Err(StorageError::UnknownField(field.to_string())),
        }
        Ok(())
    }
}

pub fn user_type() -> RecordType {
    RecordType::new("tests", "User")
}

pub fn user_schema() -> RecordSchema {
    RecordSchema::new(user_type())
        .field(FieldDescriptor::auto("id"))
        .field(FieldDescriptor::char("username", 150).unique())
        .field(FieldDescriptor::char("first_name", 150))
        .field(FieldDescriptor::char("last_name", 150))
        .field(FieldDescriptor::char("location", 255))
        .field(FieldDescriptor::text("biography"))
        .field(FieldDescriptor::uuid("uuid"))
        .field(FieldDescriptor::date("date_of_birth"))
        .field(FieldDescriptor::reverse("addresses"))
}

pub fn user_store(users: impl IntoIterator<Item = User>) -> MemoryStore<User> {
    let mut store = MemoryStore::new(user_schema());
    for user in users {
        store.insert(user).unwrap();
    }
    store
}

pub fn flintstones() -> MemoryStore<User> {
    user_store([User::new(1, "fred", "flintstone"), User::new(2, "wilma", "flintstone")])
}

/// Handler with both capabilities
///
/// Anonymises first and last name, redacts first name with a custom value
/// and leaves `location` to the caller.
#[derive(Default)]
pub struct UserAnonymiser {
    pub post_hook_calls: Mutex<Vec<FieldUpdates>>,
}

impl UserAnonymiser {
    fn anonymise_first_name(&self, obj: &mut User) {
        obj.first_name = "Anonymous".to_string();
    }

    fn anonymise_last_name(&self, obj: &mut User) {
        obj.last_name = obj.last_name.to_uppercase();
    }
}

impl Handler for UserAnonymiser {
    type Record = User;

    fn schema(&self) -> RecordSchema {
        user_schema()
    }
}

impl FieldAnonymiser for UserAnonymiser {
    const FIELD_ANONYMISERS: &'static [CustomAnonymiser<Self>] = &[
        CustomAnonymiser::new("first_name", Self::anonymise_first_name),
        CustomAnonymiser::new("last_name", Self::anonymise_last_name),
    ];

    fn post_anonymise_object(&self, _obj: &mut User, updates: &FieldUpdates) {
        self.post_hook_calls
            .lock()
            .unwrap()
            .push(updates.clone());
    }
}

impl FieldRedacter for UserAnonymiser {
    fn auto_redact_exclude(&self) -> Vec<&str> {
        vec!["location"]
    }

    fn custom_field_redactions(&self) -> RedactionValues {
        RedactionValues::new().with("first_name", "FIRST_NAME")
    }
}

/// Redacter whose text generator counts its invocations
pub struct CountingRedacter {
    pub calls: Arc<AtomicUsize>,
    pub auto_redact: bool,
}

impl CountingRedacter {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            auto_redact: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler for CountingRedacter {
    type Record = User;

    fn schema(&self) -> RecordSchema {
        user_schema()
    }
}

impl FieldRedacter for CountingRedacter {
    fn auto_redact(&self) -> bool {
        self.auto_redact
    }

    fn auto_redacters(&self) -> AutoRedacters {
        let calls = Arc::clone(&self.calls);
        AutoRedacters::default().with_generator(
            anonymiser::schema::FieldType::Text,
            move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                "counted".into()
            },
        )
    }
}
