//! Security utilities for Fluxx API operations.
//!
//! Model names and record ids end up in URL paths, so they are validated or
//! encoded before use:
//!
//! ```rust
//! use fluxx_client::security::{is_safe_model_name, encode_path_segment};
//!
//! assert!(is_safe_model_name("grant_request"));
//! assert!(!is_safe_model_name("user/../../oauth"));
//!
//! let id = encode_path_segment("42/../1");
//! assert_eq!(id, "42%2F..%2F1");
//! ```
//!
//! Error bodies are sanitised with [`sanitize_message`] before they are
//! placed into error values or logs.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Maximum length of a sanitised message.
const MAX_MESSAGE_LENGTH: usize = 500;

static BEARER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)bearer\s+[A-Za-z0-9\-._~+/]+=*").expect("valid regex"));

static TOKEN_PARAM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(access_token|client_secret)("?\s*[:=]\s*"?)[^"&\s,}]+"#)
        .expect("valid regex")
});

/// Validate that a model name is safe to place in a URL path.
///
/// Model names must start with an ASCII letter and contain only ASCII
/// alphanumerics or underscores.
#[must_use]
pub fn is_safe_model_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Percent-encode a value for use as a single URL path segment.
#[must_use]
pub fn encode_path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Sanitize a message to prevent exposing credentials.
///
/// Redacts bearer tokens and `access_token` / `client_secret` values and
/// truncates anything longer than 500 bytes.
pub fn sanitize_message(message: &str) -> String {
    let sanitized = BEARER_PATTERN.replace_all(message, "Bearer [REDACTED]");
    let mut sanitized = TOKEN_PARAM_PATTERN
        .replace_all(&sanitized, "${1}${2}[REDACTED]")
        .into_owned();

    if sanitized.len() > MAX_MESSAGE_LENGTH {
        let mut cut = MAX_MESSAGE_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_model_name() {
        assert!(is_safe_model_name("user"));
        assert!(is_safe_model_name("grant_request"));
        assert!(is_safe_model_name("mac_model_type_dyn_financial_audit"));
        assert!(!is_safe_model_name(""));
        assert!(!is_safe_model_name("_user"));
        assert!(!is_safe_model_name("9user"));
        assert!(!is_safe_model_name("user/1"));
        assert!(!is_safe_model_name("user?cols=x"));
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(encode_path_segment("101"), "101");
        assert_eq!(encode_path_segment("a b"), "a%20b");
        assert_eq!(encode_path_segment("../x"), "..%2Fx");
    }

    #[test]
    fn test_sanitize_redacts_tokens() {
        let msg = "failed with header Authorization: Bearer abc.DEF-123";
        let out = sanitize_message(msg);
        assert!(!out.contains("abc.DEF-123"));
        assert!(out.contains("Bearer [REDACTED]"));

        let msg = r#"{"access_token":"s3cr3t","client_secret": "hunter2"}"#;
        let out = sanitize_message(msg);
        assert!(!out.contains("s3cr3t"));
        assert!(!out.contains("hunter2"));
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "é".repeat(400);
        let out = sanitize_message(&long);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() <= MAX_MESSAGE_LENGTH + "...[truncated]".len());
    }

    #[test]
    fn test_sanitize_leaves_plain_messages() {
        assert_eq!(sanitize_message("invalid field"), "invalid field");
    }
}
