//! Error types for fluxx-batch.
//!
//! These cover failures of the batch as a whole. Failures of individual
//! operations never surface here; they become failed [`Outcome`](crate::Outcome)s.

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

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Invalid configuration or input, detected before any work is dispatched.
    pub fn is_config_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Config(_) | ErrorKind::Input(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid batch input: {0}")]
    Input(String),

    /// A worker session could not be established.
    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Batch aborted: {0}")]
    Aborted(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Input(err.to_string()), err)
    }
}

impl From<fluxx_auth::Error> for Error {
    fn from(err: fluxx_auth::Error) -> Self {
        let kind = if err.is_config_error() {
            ErrorKind::Config(err.to_string())
        } else {
            ErrorKind::Connect(err.to_string())
        };
        Error::with_source(kind, err)
    }
}

impl From<fluxx_rest::Error> for Error {
    fn from(err: fluxx_rest::Error) -> Self {
        let kind = match err.kind {
            fluxx_rest::ErrorKind::InvalidStyle(_) | fluxx_rest::ErrorKind::InvalidModel(_) => {
                ErrorKind::Config(err.to_string())
            }
            _ => ErrorKind::Connect(err.to_string()),
        };
        Error::with_source(kind, err)
    }
}
