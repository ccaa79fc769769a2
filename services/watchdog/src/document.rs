//! Status document schema
//!
//! The document is shared with an external reporter (which owns `last_seen`)
//! and with whoever manages `config`. Only `status` and `history` are ever
//! changed here. The document is held as an ordered JSON object so every
//! other key, known or not, keeps its value, its `null`s and its position
//! through a load/save cycle. Fields owned by others are read through
//! lenient accessors: a value of the wrong shape is logged and ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Believed liveness of the monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Online,
    Offline,
    /// Any value written by someone else that is neither online nor offline
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Online => "online",
            Status::Offline => "offline",
            Status::Other(s) => s,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "online" => Status::Online,
            "offline" => Status::Offline,
            _ => Status::Other(value),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incident entry in the document history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration_minutes: u64,
}

impl IncidentRecord {
    pub fn to_value(&self) -> Value {
        json!({
            "timestamp": self.timestamp,
            "type": self.kind,
            "duration_minutes": self.duration_minutes,
        })
    }
}

/// Telegram chat identifier; numeric ids and `@channel` names are both accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Name(String),
}

impl ChatId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ChatId::Id).or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| ChatId::Id(f as i64))
            }),
            Value::String(s) if !s.trim().is_empty() => Some(ChatId::Name(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{}", id),
            ChatId::Name(name) => f.write_str(name),
        }
    }
}

/// The `last_seen` field as found in the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LastSeen<'a> {
    /// Absent, `null` or blank
    Missing,
    Text(&'a str),
    /// Present but not a string
    Invalid(&'a Value),
}

impl<'a> LastSeen<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            LastSeen::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The persisted status document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusDocument {
    fields: Map<String, Value>,
}

impl From<Map<String, Value>> for StatusDocument {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl StatusDocument {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Current status; a document without one is treated as offline
    pub fn status(&self) -> Status {
        match self.fields.get("status") {
            None | Some(Value::Null) => Status::Offline,
            Some(Value::String(s)) => Status::from(s.clone()),
            Some(other) => Status::Other(other.to_string()),
        }
    }

    /// Overwrite `status`, keeping the key where it was
    pub fn set_status(&mut self, status: Status) {
        self.fields
            .insert("status".to_string(), Value::from(status.as_str()));
    }

    pub fn last_seen(&self) -> LastSeen<'_> {
        match self.fields.get("last_seen") {
            None | Some(Value::Null) => LastSeen::Missing,
            Some(Value::String(s)) if s.trim().is_empty() => LastSeen::Missing,
            Some(Value::String(s)) => LastSeen::Text(s),
            Some(other) => LastSeen::Invalid(other),
        }
    }

    /// History entries, newest first; empty when `history` is not a list
    pub fn history(&self) -> &[Value] {
        match self.fields.get("history") {
            Some(Value::Array(entries)) => entries,
            _ => &[],
        }
    }

    /// Insert `entry` at the front of `history`, creating the list if needed
    pub fn prepend_history(&mut self, entry: Value) {
        match self.fields.get_mut("history") {
            Some(Value::Array(entries)) => entries.insert(0, entry),
            None | Some(Value::Null) => {
                self.fields
                    .insert("history".to_string(), Value::Array(vec![entry]));
            }
            Some(previous) => {
                tracing::warn!("history is not a list; keeping the old value after the new entry");
                let old = previous.take();
                *previous = Value::Array(vec![entry, old]);
            }
        }
    }

    /// `config.alert_emails`; a single string counts as one address
    pub fn alert_emails(&self) -> Vec<String> {
        match self.config().and_then(|c| c.get("alert_emails")) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(address)) => vec![address.clone()],
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(address) => Some(address.clone()),
                    other => {
                        tracing::warn!("Ignoring non-string entry in alert_emails: {}", other);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                tracing::warn!("Ignoring alert_emails, expected a list: {}", other);
                Vec::new()
            }
        }
    }

    /// `config.telegram.enabled`; `"true"`/`"false"` strings are accepted
    pub fn telegram_enabled(&self) -> bool {
        match self.telegram().and_then(|t| t.get("enabled")) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("true") => true,
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("false") => false,
            Some(other) => {
                tracing::warn!("Ignoring telegram.enabled, expected a boolean: {}", other);
                false
            }
        }
    }

    /// `config.telegram.chat_ids`; entries that are not ids are skipped
    pub fn chat_ids(&self) -> Vec<ChatId> {
        let entries = match self.telegram().and_then(|t| t.get("chat_ids")) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries.as_slice(),
            Some(single) => std::slice::from_ref(single),
        };

        entries
            .iter()
            .filter_map(|entry| {
                let chat_id = ChatId::from_value(entry);
                if chat_id.is_none() {
                    tracing::warn!("Ignoring invalid Telegram chat id: {}", entry);
                }
                chat_id
            })
            .collect()
    }

    fn config(&self) -> Option<&Map<String, Value>> {
        object_field(&self.fields, "config")
    }

    fn telegram(&self) -> Option<&Map<String, Value>> {
        self.config().and_then(|c| object_field(c, "telegram"))
    }
}

fn object_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(inner)) => Some(inner),
        Some(other) => {
            tracing::warn!("Ignoring '{}', expected an object: {}", key, other);
            None
        }
    }
}
