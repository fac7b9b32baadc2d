//! Write payload formatting.
//!
//! Fluxx accepts record writes as a form with two JSON-encoded fields: `cols`,
//! the list of column names being written, and `data`, the column map itself.

use serde_json::{Map, Value};

use crate::error::Result;

/// Normalise a column name: trim, lowercase, and join whitespace runs with `_`.
///
/// ```
/// use fluxx_rest::format_column_name;
///
/// assert_eq!(format_column_name("test column name "), "test_column_name");
/// assert_eq!(format_column_name(" SecoNd CoLUmn"), "second_column");
/// ```
pub fn format_column_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalise every key of a record payload.
///
/// When two keys collapse to the same column, the later one in iteration
/// order wins.
pub fn format_write_data(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .map(|(key, value)| (format_column_name(key), value.clone()))
        .collect()
}

/// Build the `cols` / `data` form fields for a create or update.
pub fn format_write_request(data: &Map<String, Value>) -> Result<[(&'static str, String); 2]> {
    let data = format_write_data(data);
    let cols: Vec<&String> = data.keys().collect();

    Ok([
        ("cols", serde_json::to_string(&cols)?),
        ("data", serde_json::to_string(&data)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_column_name() {
        assert_eq!(format_column_name("test column name "), "test_column_name");
        assert_eq!(format_column_name(" SecoNd CoLUmn"), "second_column");
        assert_eq!(format_column_name("name"), "name");
        assert_eq!(format_column_name("a \t\n b"), "a_b");
        assert_eq!(format_column_name("already_snake"), "already_snake");
    }

    #[test]
    fn test_format_write_data() {
        let data = json!({"Test Column": 1, " Other  Col ": "x"});
        let formatted = format_write_data(data.as_object().unwrap());

        assert_eq!(formatted.get("test_column"), Some(&json!(1)));
        assert_eq!(formatted.get("other_col"), Some(&json!("x")));
        assert_eq!(formatted.len(), 2);
    }

    #[test]
    fn test_format_write_request() {
        let data = json!({"Name": "A", "amount requested": 100});
        let [cols, body] = format_write_request(data.as_object().unwrap()).unwrap();

        assert_eq!(cols.0, "cols");
        let cols: Vec<String> = serde_json::from_str(&cols.1).unwrap();
        assert!(cols.contains(&"name".to_string()));
        assert!(cols.contains(&"amount_requested".to_string()));

        assert_eq!(body.0, "data");
        let body: Value = serde_json::from_str(&body.1).unwrap();
        assert_eq!(body, json!({"name": "A", "amount_requested": 100}));
    }
}
