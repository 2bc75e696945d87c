use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TITLE: &str = "Untitled Document";
pub const CORRUPTED_TITLE: &str = "Corrupted File";

/// Identifier of a stored document. Doubles as the record's file stem, so only
/// ASCII alphanumerics, `-` and `_` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    pub fn parse(s: &str) -> Option<Self> {
        let valid = !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("{value:?} is not a valid document id"))
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "empty_content")]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Reads any JSON value stored under `id`. The file name is authoritative
    /// for the id; a missing or empty title reads as the default, missing
    /// content as `{}`, and a missing or unparseable `updatedAt` as none.
    pub fn from_record(id: DocumentId, record: &Value) -> Self {
        let title = match record.get("title") {
            Some(Value::String(title)) if !title.is_empty() => title.clone(),
            _ => default_title(),
        };
        let content = match record.get("content") {
            Some(Value::Null) | None => empty_content(),
            Some(content) => content.clone(),
        };
        let updated_at = record
            .get("updatedAt")
            .and_then(Value::as_str)
            .and_then(|stamp| DateTime::parse_from_rfc3339(stamp).ok())
            .map(|stamp| stamp.with_timezone(&Utc));

        Self {
            id,
            title,
            content,
            updated_at,
        }
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.to_string(),
            title: if self.title.is_empty() {
                default_title()
            } else {
                self.title.clone()
            },
            updated_at: self.updated_at,
        }
    }
}

/// Entry of the document listing. Corrupted records are listed too, with
/// [`CORRUPTED_TITLE`] and no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentSummary {
    pub fn corrupted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: CORRUPTED_TITLE.to_string(),
            updated_at: None,
        }
    }
}

/// Body of an update. Every field left out (or sent falsy) is reset to its
/// default: updates replace the whole record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl DocumentChanges {
    pub fn title_or_default(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => default_title(),
        }
    }

    pub fn content_or_default(&self) -> Value {
        match &self.content {
            Some(content) if !is_falsy(content) => content.clone(),
            _ => empty_content(),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

pub fn empty_content() -> Value {
    Value::Object(Map::new())
}
