use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_cbor::{to_vec, value::to_value};

/// Metadata of an uploaded file; the engine never sees file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub mime_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// An answer as stored in a [`ResponseMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ResponseValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Files(Vec<FileDescriptor>),
}

impl ResponseValue {
    pub fn text(value: impl Into<String>) -> Self {
        ResponseValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResponseValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Missing-answer test used by the required check: empty string or empty array.
    pub fn is_blank(&self) -> bool {
        match self {
            ResponseValue::Text(text) => text.is_empty(),
            ResponseValue::List(items) => items.is_empty(),
            ResponseValue::Files(files) => files.is_empty(),
            ResponseValue::Bool(_) | ResponseValue::Number(_) => false,
        }
    }

    /// Emptiness used by rule evaluation: also treats whitespace-only text as empty.
    pub fn is_empty_answer(&self) -> bool {
        match self {
            ResponseValue::Text(text) => text.trim().is_empty(),
            other => other.is_blank(),
        }
    }

    /// Numeric view of the value; text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(number) if number.is_finite() => Some(*number),
            ResponseValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// String items of an array answer; file answers expose their names.
    pub fn items(&self) -> Option<Vec<&str>> {
        match self {
            ResponseValue::List(items) => Some(items.iter().map(String::as_str).collect()),
            ResponseValue::Files(files) => Some(files.iter().map(|file| file.name.as_str()).collect()),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseValue::Bool(flag) => write!(f, "{flag}"),
            ResponseValue::Number(number) => {
                if number.fract() == 0.0 && number.abs() < 1e15 {
                    write!(f, "{}", *number as i64)
                } else {
                    write!(f, "{number}")
                }
            }
            ResponseValue::Text(text) => f.write_str(text),
            ResponseValue::List(items) => f.write_str(&items.join(", ")),
            ResponseValue::Files(files) => {
                let names = files
                    .iter()
                    .map(|file| file.name.as_str())
                    .collect::<Vec<_>>();
                f.write_str(&names.join(", "))
            }
        }
    }
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        ResponseValue::Text(value.to_string())
    }
}

impl From<String> for ResponseValue {
    fn from(value: String) -> Self {
        ResponseValue::Text(value)
    }
}

impl From<f64> for ResponseValue {
    fn from(value: f64) -> Self {
        ResponseValue::Number(value)
    }
}

impl From<i64> for ResponseValue {
    fn from(value: i64) -> Self {
        ResponseValue::Number(value as f64)
    }
}

impl From<bool> for ResponseValue {
    fn from(value: bool) -> Self {
        ResponseValue::Bool(value)
    }
}

impl From<Vec<FileDescriptor>> for ResponseValue {
    fn from(value: Vec<FileDescriptor>) -> Self {
        ResponseValue::Files(value)
    }
}

/// A respondent's answers keyed by component id. Absent keys are unanswered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct ResponseMap(BTreeMap<String, ResponseValue>);

impl<'de> Deserialize<'de> for ResponseMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // `null` entries mean "no answer yet".
        let raw = BTreeMap::<String, Option<ResponseValue>>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
        ))
    }
}

impl ResponseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ResponseValue> {
        self.0.get(id)
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<ResponseValue>) {
        self.0.insert(id.into(), value.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<ResponseValue> {
        self.0.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResponseValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn with(mut self, id: impl Into<String>, value: impl Into<ResponseValue>) -> Self {
        self.set(id, value);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for ResponseMap
where
    K: Into<String>,
    V: Into<ResponseValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Completed,
    Partial,
}

/// Finalized or partial record of a respondent's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub form_id: String,
    pub response_data: ResponseMap,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    pub fn is_completed(&self) -> bool {
        self.status == SubmissionStatus::Completed
    }

    /// Serializes the submission as canonical CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        let canonical = to_value(self)?;
        to_vec(&canonical)
    }

    /// Serializes the submission as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
