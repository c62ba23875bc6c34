//! User profile types and the partial-update document used by autosave.
//!
//! A profile document has five independently autosaved fields. `FieldValue`
//! carries one typed field, `ProfileFields` is a partial document (the sync
//! batch on the way out, the loaded document on the way in), and
//! `UserProfile` is the fully-populated local state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::{ChatMessage, initial_transcript};
use crate::task::{StudyTask, starter_tasks};

/// Default sleep hours for a fresh profile.
pub const DEFAULT_SLEEP_HOURS: f64 = 6.0;

/// Names of the autosaved profile fields.
///
/// The wire names (`sleepHours`, `chatHistory`) are the document keys used
/// by every profile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    Name,
    Email,
    SleepHours,
    Tasks,
    ChatHistory,
}

impl ProfileField {
    /// Every field, in document order.
    pub const ALL: [ProfileField; 5] = [
        ProfileField::Name,
        ProfileField::Email,
        ProfileField::SleepHours,
        ProfileField::Tasks,
        ProfileField::ChatHistory,
    ];

    /// Document key for this field.
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Email => "email",
            ProfileField::SleepHours => "sleepHours",
            ProfileField::Tasks => "tasks",
            ProfileField::ChatHistory => "chatHistory",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("invalid profile field: '{s}'"))
    }
}

/// One typed profile field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Name(String),
    Email(String),
    SleepHours(f64),
    Tasks(Vec<StudyTask>),
    ChatHistory(Vec<ChatMessage>),
}

impl FieldValue {
    /// The field this value belongs to.
    pub fn field(&self) -> ProfileField {
        match self {
            FieldValue::Name(_) => ProfileField::Name,
            FieldValue::Email(_) => ProfileField::Email,
            FieldValue::SleepHours(_) => ProfileField::SleepHours,
            FieldValue::Tasks(_) => ProfileField::Tasks,
            FieldValue::ChatHistory(_) => ProfileField::ChatHistory,
        }
    }

    /// Serialize just this value as JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            FieldValue::Name(v) | FieldValue::Email(v) => serde_json::to_value(v),
            FieldValue::SleepHours(v) => serde_json::to_value(v),
            FieldValue::Tasks(v) => serde_json::to_value(v),
            FieldValue::ChatHistory(v) => serde_json::to_value(v),
        }
    }

    /// Deserialize a JSON value stored under `field`.
    pub fn from_json(
        field: ProfileField,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match field {
            ProfileField::Name => FieldValue::Name(serde_json::from_value(value)?),
            ProfileField::Email => FieldValue::Email(serde_json::from_value(value)?),
            ProfileField::SleepHours => FieldValue::SleepHours(serde_json::from_value(value)?),
            ProfileField::Tasks => FieldValue::Tasks(serde_json::from_value(value)?),
            ProfileField::ChatHistory => FieldValue::ChatHistory(serde_json::from_value(value)?),
        })
    }
}

/// A partial profile document.
///
/// Absent fields are omitted from the serialized form, so writing a
/// `ProfileFields` with merge semantics never touches fields it does not
/// carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<StudyTask>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_history: Option<Vec<ChatMessage>>,
}

impl ProfileFields {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.sleep_hours.is_none()
            && self.tasks.is_none()
            && self.chat_history.is_none()
    }

    /// Set one field, replacing any previous value for it.
    pub fn insert(&mut self, value: FieldValue) {
        match value {
            FieldValue::Name(v) => self.name = Some(v),
            FieldValue::Email(v) => self.email = Some(v),
            FieldValue::SleepHours(v) => self.sleep_hours = Some(v),
            FieldValue::Tasks(v) => self.tasks = Some(v),
            FieldValue::ChatHistory(v) => self.chat_history = Some(v),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, value: FieldValue) -> Self {
        self.insert(value);
        self
    }

    /// The value of one field, if present.
    pub fn get(&self, field: ProfileField) -> Option<FieldValue> {
        match field {
            ProfileField::Name => self.name.clone().map(FieldValue::Name),
            ProfileField::Email => self.email.clone().map(FieldValue::Email),
            ProfileField::SleepHours => self.sleep_hours.map(FieldValue::SleepHours),
            ProfileField::Tasks => self.tasks.clone().map(FieldValue::Tasks),
            ProfileField::ChatHistory => self.chat_history.clone().map(FieldValue::ChatHistory),
        }
    }

    /// Names of the present fields, in document order.
    pub fn fields(&self) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|field| self.contains(*field))
            .collect()
    }

    /// Whether a field is present.
    pub fn contains(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Name => self.name.is_some(),
            ProfileField::Email => self.email.is_some(),
            ProfileField::SleepHours => self.sleep_hours.is_some(),
            ProfileField::Tasks => self.tasks.is_some(),
            ProfileField::ChatHistory => self.chat_history.is_some(),
        }
    }

    /// All present values, in document order.
    pub fn values(&self) -> Vec<FieldValue> {
        ProfileField::ALL
            .into_iter()
            .filter_map(|field| self.get(field))
            .collect()
    }

    /// Overlay `other` on top of `self`: present fields in `other` win.
    pub fn merge(&mut self, other: ProfileFields) {
        for value in other.values() {
            self.insert(value);
        }
    }
}

/// The fully-populated local profile state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub sleep_hours: f64,
    pub tasks: Vec<StudyTask>,
    pub chat_history: Vec<ChatMessage>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            sleep_hours: DEFAULT_SLEEP_HOURS,
            tasks: starter_tasks(),
            chat_history: initial_transcript(),
        }
    }
}

impl UserProfile {
    /// Apply a loaded (possibly partial) document over the current state.
    pub fn apply(&mut self, fields: ProfileFields) {
        if let Some(name) = fields.name {
            self.name = name;
        }
        if let Some(email) = fields.email {
            self.email = email;
        }
        if let Some(hours) = fields.sleep_hours {
            self.sleep_hours = hours;
        }
        if let Some(tasks) = fields.tasks {
            self.tasks = tasks;
        }
        if let Some(history) = fields.chat_history {
            self.chat_history = history;
        }
    }

    /// Current value of one field.
    pub fn value(&self, field: ProfileField) -> FieldValue {
        match field {
            ProfileField::Name => FieldValue::Name(self.name.clone()),
            ProfileField::Email => FieldValue::Email(self.email.clone()),
            ProfileField::SleepHours => FieldValue::SleepHours(self.sleep_hours),
            ProfileField::Tasks => FieldValue::Tasks(self.tasks.clone()),
            ProfileField::ChatHistory => FieldValue::ChatHistory(self.chat_history.clone()),
        }
    }

    /// Every field as a complete document.
    pub fn snapshot(&self) -> ProfileFields {
        ProfileField::ALL
            .into_iter()
            .fold(ProfileFields::default(), |fields, field| {
                fields.with(self.value(field))
            })
    }
}
