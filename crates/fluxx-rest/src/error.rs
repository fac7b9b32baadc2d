//! Error types for fluxx-rest.

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Wrap a transport error, attaching model and action context when the
    /// server answered with a Fluxx error object.
    pub(crate) fn from_client(err: fluxx_client::Error, model: &str, action: &str) -> Self {
        if let fluxx_client::ErrorKind::FluxxApi { code, message } = &err.kind {
            let kind = ErrorKind::Api {
                model: model.to_string(),
                action: action.to_string(),
                code: code.clone(),
                message: message.clone(),
            };
            return Error {
                kind,
                source: Some(Box::new(err)),
            };
        }
        err.into()
    }

    fn client_error(&self) -> Option<&fluxx_client::Error> {
        self.source.as_deref()?.downcast_ref::<fluxx_client::Error>()
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Rate limiting, timeouts, connection failures and 500/502/503/504
    /// responses are transient; everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            ErrorKind::Client(_) => self.client_error().is_some_and(|e| e.is_retryable()),
            _ => false,
        }
    }

    /// Server-provided delay before retrying, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        self.client_error().and_then(|e| e.retry_after())
    }

    /// The bare message of a Fluxx API error, or the full display otherwise.
    pub fn message(&self) -> String {
        match &self.kind {
            ErrorKind::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Client error: {0}")]
    Client(String),

    /// Error object returned by Fluxx for a specific model and action.
    #[error("Error performing {action} request on {model}. Code: {code}. Message: {message}")]
    Api {
        model: String,
        action: String,
        code: String,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid model name: {0:?}")]
    InvalidModel(String),

    #[error("Style must be one of: detail, compact, full (got {0:?})")]
    InvalidStyle(String),

    #[error("Page number must be greater than 0")]
    InvalidPage,

    #[error("{0}")]
    Other(String),
}

impl From<fluxx_client::Error> for Error {
    fn from(err: fluxx_client::Error) -> Self {
        Error {
            kind: ErrorKind::Client(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<fluxx_auth::Error> for Error {
    fn from(err: fluxx_auth::Error) -> Self {
        Error {
            kind: ErrorKind::Auth(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Other(format!("JSON error: {err}")),
            source: Some(Box::new(err)),
        }
    }
}
