//! Core HTTP client with retry, compression, and Fluxx-specific handling.

use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{is_retryable_status, Error, ErrorKind, Result};
use crate::request::{RequestBuilder, RequestMethod};
use crate::response::{parse_retry_after, Response, ResponseExt};
use crate::retry::RetryPolicy;
use crate::security::sanitize_message;

/// HTTP client for the Fluxx API with built-in retry, compression, and error handling.
#[derive(Debug, Clone)]
pub struct FluxxHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl FluxxHttpClient {
    /// Create a new HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.compression.accept_compressed)
            .deflate(config.compression.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self { inner, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Put, url)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Delete, url)
    }

    /// Execute a request, retrying transient failures per the configured policy.
    ///
    /// Non-success responses are converted into errors.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let mut retry_policy = self.config.retry.clone().map(RetryPolicy::new);

        loop {
            let err = match self.execute_once(&request).await {
                Ok(response) => return response.check_fluxx_error().await,
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            let Some(policy) = retry_policy.as_mut() else {
                return Err(err);
            };

            match policy.next_delay(err.retry_after()) {
                Some(delay) => {
                    warn!(
                        attempt = policy.attempt(),
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(Error::with_source(
                        ErrorKind::RetriesExhausted {
                            attempts: policy.attempt(),
                        },
                        err,
                    ));
                }
            }
        }
    }

    /// Execute a single request without retry logic.
    ///
    /// Rate limiting and retryable server errors are returned as errors so the
    /// retry loop can see them; everything else is handed back as a response.
    async fn execute_once(&self, request: &RequestBuilder) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method.to_reqwest(), &request.url);

        if let Some(ref token) = request.bearer_token {
            req = req.bearer_auth(token);
        }

        if !request.query_params.is_empty() {
            req = req.query(&request.query_params);
        }

        if let Some(ref fields) = request.form {
            req = req.form(fields);
        }

        if self.config.enable_tracing {
            debug!(method = %request.method, url = %request.url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            let content_length = response.content_length();
            if response.status().is_success() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);

            return Err(Error::new(ErrorKind::RateLimited { retry_after }));
        }

        if is_retryable_status(status) {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::new(ErrorKind::Http {
                status,
                message: sanitize_message(&body),
            }));
        }

        Ok(Response::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn no_retry_client() -> FluxxHttpClient {
        FluxxHttpClient::new(ClientConfig::builder().without_retry().build()).unwrap()
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = FluxxHttpClient::new(ClientConfig::default()).unwrap();
        assert!(client.config().compression.accept_compressed);
    }

    #[tokio::test]
    async fn test_successful_request_with_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rest/v2/user"))
            .and(header("Authorization", "Bearer test-token"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "records": {"user": []}
            })))
            .mount(&mock_server)
            .await;

        let client = no_retry_client();
        let response = client
            .execute(
                client
                    .get(format!("{}/api/rest/v2/user", mock_server.uri()))
                    .bearer_auth("test-token")
                    .query("page", "2"),
            )
            .await
            .unwrap();

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_form_body_is_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("data=%7B%22name%22%3A%22A%22%7D"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "user": {"id": 7}
            })))
            .mount(&mock_server)
            .await;

        let client = no_retry_client();
        let response = client
            .execute(
                client
                    .post(format!("{}/user", mock_server.uri()))
                    .form([("data", r#"{"name":"A"}"#)]),
            )
            .await
            .unwrap();

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["user"]["id"], 7);
    }

    #[tokio::test]
    async fn test_fluxx_error_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/user/5"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "error": {"code": 422, "message": "invalid field"}
            })))
            .mount(&mock_server)
            .await;

        let client = no_retry_client();
        let err = client
            .execute(client.put(format!("{}/user/5", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(!err.is_retryable());
        match err.kind {
            ErrorKind::FluxxApi { code, message } => {
                assert_eq!(code, "422");
                assert_eq!(message, "invalid field");
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limiting_without_retry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&mock_server)
            .await;

        let client = no_retry_client();
        let err = client
            .execute(client.get(format!("{}/limited", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_retry_on_503() {
        let mock_server = MockServer::start().await;
        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        Mock::given(method("GET"))
            .and(path("/retry"))
            .respond_with(move |_: &wiremock::Request| {
                let count = call_count_clone.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true}))
                }
            })
            .mount(&mock_server)
            .await;

        let client = FluxxHttpClient::new(
            ClientConfig::builder()
                .with_retry(
                    crate::RetryConfig::default()
                        .with_max_attempts(3)
                        .with_initial_delay(Duration::from_millis(10)),
                )
                .build(),
        )
        .unwrap();

        let response = client
            .execute(client.get(format!("{}/retry", mock_server.uri())))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(502))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = FluxxHttpClient::new(
            ClientConfig::builder()
                .with_retry(
                    crate::RetryConfig::default()
                        .with_max_attempts(1)
                        .with_initial_delay(Duration::from_millis(5)),
                )
                .build(),
        )
        .unwrap();

        let err = client
            .execute(client.get(format!("{}/down", mock_server.uri())))
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ErrorKind::RetriesExhausted { attempts: 1 }));
    }
}
