//! Operations submitted to a batch.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name to value mapping sent to the remote API.
pub type Record = serde_json::Map<String, Value>;

/// Remote record identifier.
///
/// Fluxx ids are integers, but callers may hold them as strings. Integers
/// serialize as JSON numbers and strings as JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Read an id from a JSON value.
    ///
    /// `null` and the empty string mean "no id". Numbers that do not fit an
    /// `i64` are kept in their textual form.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => RecordId::Int(i),
                None => RecordId::Str(n.to_string()),
            }),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(RecordId::Str(s.clone())),
            other => Some(RecordId::Str(other.to_string())),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{i}"),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Str(id.to_string())
    }
}

/// What an operation does to its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    /// A method this engine does not implement, kept verbatim.
    Unsupported(String),
}

impl OperationKind {
    /// Parse a method name, ignoring ASCII case.
    pub fn parse(method: &str) -> Self {
        match method.trim().to_ascii_uppercase().as_str() {
            "CREATE" => OperationKind::Create,
            "UPDATE" => OperationKind::Update,
            "DELETE" => OperationKind::Delete,
            _ => OperationKind::Unsupported(method.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Create => "CREATE",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
            OperationKind::Unsupported(method) => method,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single write against one record, addressed by its input position.
///
/// Operations are never mutated after dispatch; a retry re-publishes the same
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Position in the input list, the final sort key.
    pub index: usize,
    pub model: String,
    pub kind: OperationKind,
    /// Required for updates and deletes.
    pub record_id: Option<RecordId>,
    pub payload: Record,
}

impl Operation {
    pub fn new(index: usize, model: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            index,
            model: model.into(),
            kind,
            record_id: None,
            payload: Record::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    pub fn with_payload(mut self, payload: Record) -> Self {
        self.payload = payload;
        self
    }
}
