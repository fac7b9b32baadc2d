//! Remote API contract consumed by the batch engine.
//!
//! Workers talk to the remote service only through [`RecordApi`]. Each worker
//! owns one session, obtained from a [`Connector`] before any work is
//! dispatched.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::instrument;

use fluxx_auth::FluxxCredentials;
use fluxx_client::ClientConfig;
use fluxx_rest::{FluxxRestClient, Style};

use crate::error::Result;
use crate::operation::{Record, RecordId};

/// Whether retrying a failed call may succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Permanent,
}

/// A failed remote call, classified for the retry controller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    pub kind: FailureKind,
    pub message: String,
    /// Server-provided delay before retrying.
    pub retry_after: Option<Duration>,
}

impl RemoteError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Permanent,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

impl From<fluxx_rest::Error> for RemoteError {
    fn from(err: fluxx_rest::Error) -> Self {
        Self {
            kind: if err.is_transient() {
                FailureKind::Transient
            } else {
                FailureKind::Permanent
            },
            message: err.message(),
            retry_after: err.retry_after(),
        }
    }
}

/// Record writes against a remote service.
pub trait RecordApi: Send + Sync + 'static {
    /// Create a record and return it; the returned object carries the new `id`.
    fn create(
        &self,
        model: &str,
        payload: &Record,
    ) -> impl Future<Output = std::result::Result<Value, RemoteError>> + Send;

    /// Update a record and return it.
    fn update(
        &self,
        model: &str,
        id: &RecordId,
        payload: &Record,
    ) -> impl Future<Output = std::result::Result<Value, RemoteError>> + Send;

    /// Delete a record.
    fn delete(
        &self,
        model: &str,
        id: &RecordId,
    ) -> impl Future<Output = std::result::Result<(), RemoteError>> + Send;
}

/// Source of independent authenticated sessions, one per worker.
pub trait Connector: Send + Sync {
    type Session: RecordApi;

    fn connect(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}

impl RecordApi for FluxxRestClient {
    async fn create(&self, model: &str, payload: &Record) -> std::result::Result<Value, RemoteError> {
        Ok(FluxxRestClient::create(self, model, payload).await?)
    }

    async fn update(
        &self,
        model: &str,
        id: &RecordId,
        payload: &Record,
    ) -> std::result::Result<Value, RemoteError> {
        Ok(FluxxRestClient::update(self, model, &id.to_string(), payload).await?)
    }

    async fn delete(&self, model: &str, id: &RecordId) -> std::result::Result<(), RemoteError> {
        Ok(FluxxRestClient::delete(self, model, &id.to_string()).await?)
    }
}

/// Connects Fluxx REST sessions with the client-credentials grant.
///
/// Every call to [`connect`](Connector::connect) performs its own token
/// exchange and builds its own connection pool.
#[derive(Debug, Clone)]
pub struct FluxxConnector {
    credentials: FluxxCredentials,
    api_version: String,
    style: Style,
    config: ClientConfig,
}

impl FluxxConnector {
    /// Sessions use [`ClientConfig::for_batch`]: transient failures are
    /// retried by the batch engine, not inside the HTTP client.
    pub fn new(credentials: FluxxCredentials) -> Self {
        Self {
            credentials,
            api_version: fluxx_client::DEFAULT_API_VERSION.to_string(),
            style: Style::default(),
            config: ClientConfig::for_batch(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }
}

impl Connector for FluxxConnector {
    type Session = FluxxRestClient;

    #[instrument(skip(self), fields(instance = %self.credentials.instance().name()))]
    async fn connect(&self) -> Result<FluxxRestClient> {
        let client =
            FluxxRestClient::connect(&self.credentials, &self.api_version, self.config.clone())
                .await?;
        Ok(client.with_style(self.style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxx_auth::Instance;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "session-token"
            })))
            .mount(server)
            .await;
    }

    fn connector(uri: &str) -> FluxxConnector {
        let creds = FluxxCredentials::new(
            Instance::with_base_url("test", uri).unwrap(),
            "id",
            "secret",
        )
        .unwrap();
        FluxxConnector::new(creds)
    }

    #[test]
    fn test_remote_error_classification() {
        let err: RemoteError = fluxx_rest::Error::from(fluxx_client::Error::new(
            fluxx_client::ErrorKind::Timeout,
        ))
        .into();
        assert!(err.is_transient());

        let err: RemoteError = fluxx_rest::Error::new(fluxx_rest::ErrorKind::InvalidPage).into();
        assert_eq!(err.kind, FailureKind::Permanent);
    }

    #[tokio::test]
    async fn test_connector_and_session() {
        let mock_server = MockServer::start().await;
        mount_token(&mock_server).await;

        Mock::given(method("POST"))
            .and(path("/api/rest/v2/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": 101}
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/api/rest/v2/user/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 400, "message": "invalid field"}
            })))
            .mount(&mock_server)
            .await;

        let session = connector(&mock_server.uri()).connect().await.unwrap();
        let payload = json!({"name": "A"}).as_object().cloned().unwrap();

        let record = RecordApi::create(&session, "user", &payload).await.unwrap();
        assert_eq!(record["id"], 101);

        let err = RecordApi::update(&session, "user", &RecordId::Int(5), &payload)
            .await
            .unwrap_err();
        assert_eq!(err, RemoteError::permanent("invalid field"));
    }

    #[tokio::test]
    async fn test_connector_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "unknown client"
            })))
            .mount(&mock_server)
            .await;

        let err = connector(&mock_server.uri()).connect().await.unwrap_err();
        assert!(matches!(err.kind, crate::ErrorKind::Connect(ref m) if m.contains("unknown client")));
    }
}
