//! Batch input parsing.
//!
//! Input is either a bare JSON list of record objects or an object with a
//! `records` list. Each record may carry the control fields `id` and
//! `method`; everything else is payload.

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};
use crate::operation::{Operation, OperationKind, Record, RecordId};

/// Control field holding the remote record id.
pub const ID_FIELD: &str = "id";

/// Control field holding the operation method.
pub const METHOD_FIELD: &str = "method";

/// How each record's operation kind is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KindSelection {
    /// Use the record's `method`; without one, create when `id` is missing
    /// and update otherwise.
    #[default]
    Infer,
    /// Apply the same kind to every record, ignoring `method`.
    Force(OperationKind),
}

impl KindSelection {
    fn select(&self, method: Option<&Value>, id: Option<&RecordId>) -> OperationKind {
        if let KindSelection::Force(kind) = self {
            return kind.clone();
        }

        match method {
            Some(Value::String(method)) => OperationKind::parse(method),
            Some(Value::Null) | None => match id {
                Some(_) => OperationKind::Update,
                None => OperationKind::Create,
            },
            Some(other) => OperationKind::Unsupported(other.to_string()),
        }
    }
}

/// Parse batch input text into operations for `model`.
pub fn parse_input(input: &str, model: &str, selection: &KindSelection) -> Result<Vec<Operation>> {
    let value: Value = serde_json::from_str(input)?;
    operations_from_value(value, model, selection)
}

/// Build operations from an already-parsed input document.
pub fn operations_from_value(
    value: Value,
    model: &str,
    selection: &KindSelection,
) -> Result<Vec<Operation>> {
    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(Error::new(ErrorKind::Input(
                    "expected a list of records or an object with a \"records\" list".to_string(),
                )))
            }
        },
        _ => {
            return Err(Error::new(ErrorKind::Input(
                "expected a list of records or an object with a \"records\" list".to_string(),
            )))
        }
    };

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(payload) => Ok(build_operation(index, model, payload, selection)),
            other => Err(Error::new(ErrorKind::Input(format!(
                "record {index} is not a JSON object: {}",
                type_name(&other)
            )))),
        })
        .collect()
}

fn build_operation(
    index: usize,
    model: &str,
    mut payload: Record,
    selection: &KindSelection,
) -> Operation {
    let record_id = payload
        .remove(ID_FIELD)
        .as_ref()
        .and_then(RecordId::from_value);
    let method = payload.remove(METHOD_FIELD);
    let kind = selection.select(method.as_ref(), record_id.as_ref());

    Operation {
        index,
        model: model.to_string(),
        kind,
        record_id,
        payload,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
