//! HTTP response handling with Fluxx-specific extensions.

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{is_retryable_status, Error, ErrorKind, Result};
use crate::security::sanitize_message;

/// Wrapper around an HTTP response with additional functionality.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    /// Get the Retry-After header as a Duration.
    ///
    /// Only the delta-seconds form is understood.
    pub fn retry_after(&self) -> Option<Duration> {
        parse_retry_after(self.header("retry-after")?)
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    ///
    /// An empty body deserializes as JSON `null`, which lets callers ask for
    /// `serde_json::Value` from endpoints that answer 204.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let bytes = self.inner.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_value(serde_json::Value::Null).map_err(Into::into);
        }
        serde_json::from_slice(&bytes).map_err(Into::into)
    }
}

pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Extension trait for processing Fluxx API responses.
pub trait ResponseExt {
    /// Check for Fluxx API errors and convert to the appropriate error type.
    fn check_fluxx_error(self) -> impl std::future::Future<Output = Result<Response>> + Send;
}

impl ResponseExt for Response {
    async fn check_fluxx_error(self) -> Result<Response> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        let retry_after = self.retry_after();
        let body = self.text().await.unwrap_or_default();
        Err(parse_error_response(status, retry_after, &body))
    }
}

/// Extract the `error` object of a Fluxx response body, if there is one.
///
/// Fluxx reports application errors as `{"error": {"code": .., "message": ..}}`,
/// sometimes with a 200 status. `code` may be numeric and `message` may be a
/// structured validation map, so both are rendered to strings.
pub fn fluxx_api_error(body: &serde_json::Value) -> Option<ErrorKind> {
    let error = body.as_object()?.get("error")?;

    let (code, message) = match error {
        serde_json::Value::Object(map) => (
            map.get("code").map(render).unwrap_or_default(),
            map.get("message").map(render).unwrap_or_default(),
        ),
        other => (String::new(), render(other)),
    };

    Some(ErrorKind::FluxxApi {
        code,
        message: sanitize_message(&message),
    })
}

fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Map a non-success response to an error kind.
fn parse_error_response(status: u16, retry_after: Option<Duration>, body: &str) -> Error {
    if status == 429 {
        return Error::new(ErrorKind::RateLimited { retry_after });
    }

    // Server-side failures stay transient even when they carry an error body.
    if is_retryable_status(status) {
        return Error::new(ErrorKind::Http {
            status,
            message: sanitize_message(body),
        });
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(kind) = fluxx_api_error(&value) {
            return Error::new(kind);
        }
    }

    let sanitized = sanitize_message(body);
    let kind = match status {
        401 => ErrorKind::Authentication(sanitized),
        403 => ErrorKind::Authorization(sanitized),
        404 => ErrorKind::NotFound(sanitized),
        _ => ErrorKind::Http {
            status,
            message: sanitized,
        },
    };

    Error::new(kind)
}
