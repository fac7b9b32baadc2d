//! Request options: response style and list paging.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};

/// Response verbosity, passed to Fluxx unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Detail,
    Compact,
    #[default]
    Full,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Detail => "detail",
            Style::Compact => "compact",
            Style::Full => "full",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "detail" => Ok(Style::Detail),
            "compact" => Ok(Style::Compact),
            "full" => Ok(Style::Full),
            other => Err(Error::new(ErrorKind::InvalidStyle(other.to_string()))),
        }
    }
}

/// Options for listing records of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Columns to return.
    pub cols: Vec<String>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    /// Optional Fluxx filter expression, sent JSON-encoded.
    pub filter: Option<Value>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            cols: vec!["id".to_string()],
            page: 1,
            per_page: 100,
            filter: None,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cols = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Render as query parameters. Page 0 is rejected.
    pub(crate) fn to_query(&self) -> Result<Vec<(String, String)>> {
        if self.page == 0 {
            return Err(Error::new(ErrorKind::InvalidPage));
        }

        let mut query = vec![
            ("cols".to_string(), serde_json::to_string(&self.cols)?),
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        if let Some(ref filter) = self.filter {
            query.push(("filter".to_string(), serde_json::to_string(filter)?));
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_style_parse() {
        assert_eq!("detail".parse::<Style>().unwrap(), Style::Detail);
        assert_eq!("compact".parse::<Style>().unwrap(), Style::Compact);
        assert_eq!("full".parse::<Style>().unwrap(), Style::Full);
        assert_eq!(Style::default(), Style::Full);

        let err = "verbose".parse::<Style>().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidStyle(ref s) if s == "verbose"));
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListOptions::default().to_query().unwrap();
        assert_eq!(
            query,
            vec![
                ("cols".to_string(), r#"["id"]"#.to_string()),
                ("page".to_string(), "1".to_string()),
                ("per_page".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_list_query_with_filter() {
        let query = ListOptions::new()
            .with_cols(["id", "name"])
            .with_page(3)
            .with_per_page(25)
            .with_filter(json!({"group_type": "and"}))
            .to_query()
            .unwrap();

        assert_eq!(query[0].1, r#"["id","name"]"#);
        assert_eq!(query[1].1, "3");
        assert_eq!(query[2].1, "25");
        assert_eq!(query[3], ("filter".to_string(), r#"{"group_type":"and"}"#.to_string()));
    }

    #[test]
    fn test_page_zero_rejected() {
        let err = ListOptions::new().with_page(0).to_query().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidPage));
    }
}
