//! Response body parsing.

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Key under which Fluxx returns records of `model`.
///
/// The key is the lowercased model name, except that dynamic models (whose
/// first underscore-separated segment is `mac`) are returned under
/// `machine_model`.
pub fn record_key(model: &str) -> String {
    if model.split('_').next() == Some("mac") {
        "machine_model".to_string()
    } else {
        model.to_lowercase()
    }
}

/// Extract the record (or record list) for `model` from a response body.
///
/// An `error` object in the body becomes [`ErrorKind::Api`] regardless of the
/// HTTP status. List responses wrap records in a `records` object. A missing
/// key yields `null`.
pub fn parse_response(body: Value, model: &str, action: &str) -> Result<Value> {
    if let Some(fluxx_client::ErrorKind::FluxxApi { code, message }) =
        fluxx_client::fluxx_api_error(&body)
    {
        return Err(Error::new(ErrorKind::Api {
            model: model.to_string(),
            action: action.to_string(),
            code,
            message,
        }));
    }

    let key = record_key(model);
    let Value::Object(mut map) = body else {
        return Ok(Value::Null);
    };

    let record = match map.remove("records") {
        Some(Value::Object(mut records)) => records.remove(&key),
        Some(_) => None,
        None => map.remove(&key),
    };

    Ok(record.unwrap_or(Value::Null))
}
