//! Error types for fluxx-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for fluxx-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fluxx-auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the failure is a configuration problem rather than a
    /// rejected or failed token exchange.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EnvVar(_) | ErrorKind::InvalidCredentials(_) | ErrorKind::Config(_)
        )
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The token endpoint refused the credentials.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Invalid credentials configuration.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A required environment variable is missing.
    #[error("Instance environment parameter \"{0}\" must be set.")]
    EnvVar(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP error during authentication.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let message = fluxx_client::security::sanitize_message(&err.to_string());
        Error::with_source(ErrorKind::Http(message), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Other(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("invalid instance URL: {err}")), err)
    }
}

impl From<fluxx_client::Error> for Error {
    fn from(err: fluxx_client::Error) -> Self {
        let message = fluxx_client::security::sanitize_message(&err.to_string());
        Error::with_source(ErrorKind::Http(message), err)
    }
}
