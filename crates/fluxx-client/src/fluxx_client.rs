//! High-level Fluxx client with typed HTTP methods.
//!
//! `FluxxClient` pairs an API base URL and bearer token with the retrying
//! [`FluxxHttpClient`] and exposes JSON-returning helpers for the request
//! shapes the Fluxx REST API uses: query-string reads and form-encoded writes.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Sensitive parameters are skipped in tracing spans

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::client::FluxxHttpClient;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::RequestBuilder;

/// High-level Fluxx API client.
///
/// Holds the versioned API root (for example
/// `https://acme.fluxx.io/api/rest/v2`) and an access token. It is cheap to
/// clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use fluxx_client::FluxxClient;
///
/// let client = FluxxClient::new("https://acme.fluxx.io/api/rest/v2", token)?;
/// let body: serde_json::Value = client
///     .post_form_json(&client.api_url("organization"), [("data", "{}")])
///     .await?;
/// ```
#[derive(Clone)]
pub struct FluxxClient {
    http: FluxxHttpClient,
    api_url: String,
    access_token: String,
}

impl std::fmt::Debug for FluxxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluxxClient")
            .field("api_url", &self.api_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl FluxxClient {
    /// Create a new client for the given API root and access token.
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(api_url, access_token, ClientConfig::default())
    }

    /// Create a new client with custom HTTP configuration.
    pub fn with_config(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = FluxxHttpClient::new(config)?;
        Ok(Self::from_parts(http, api_url, access_token))
    }

    /// Build a client around an existing HTTP client.
    pub fn from_parts(
        http: FluxxHttpClient,
        api_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// The versioned API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.api_url
    }

    /// Get the access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &FluxxHttpClient {
        &self.http
    }

    /// Build the full URL for a path below the API root.
    ///
    /// Example: `api_url("grant_request/42")` -> `{root}/grant_request/42`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Create a GET request builder with authentication.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    /// Create a POST request builder with authentication.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    /// Create a PUT request builder with authentication.
    pub fn put(&self, url: &str) -> RequestBuilder {
        self.http.put(url).bearer_auth(&self.access_token)
    }

    /// Create a DELETE request builder with authentication.
    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.http.delete(url).bearer_auth(&self.access_token)
    }

    /// Execute a request and return the raw response.
    pub async fn execute(&self, request: RequestBuilder) -> Result<crate::Response> {
        self.http.execute(request).await
    }

    /// GET request with query parameters and JSON response deserialization.
    #[instrument(skip(self, query), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let request = self.get(url).query_pairs(query.iter().cloned());
        self.http.execute(request).await?.json().await
    }

    /// POST a form-encoded body and deserialize the JSON response.
    #[instrument(skip(self, fields), fields(url = %url))]
    pub async fn post_form_json<T, K, V>(
        &self,
        url: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.post(url).form(fields);
        self.http.execute(request).await?.json().await
    }

    /// PUT a form-encoded body and deserialize the JSON response.
    #[instrument(skip(self, fields), fields(url = %url))]
    pub async fn put_form_json<T, K, V>(
        &self,
        url: &str,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        K: Into<String>,
        V: Into<String>,
    {
        let request = self.put(url).form(fields);
        self.http.execute(request).await?.json().await
    }

    /// DELETE request; an empty response body deserializes as `null`.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let request = self.delete(url);
        self.http.execute(request).await?.json().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: &str) -> FluxxClient {
        FluxxClient::with_config(
            format!("{uri}/api/rest/v2/"),
            "token123",
            ClientConfig::builder().without_retry().build(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = FluxxClient::new("https://acme.fluxx.io/api/rest/v2/", "token123").unwrap();

        assert_eq!(client.base_url(), "https://acme.fluxx.io/api/rest/v2");
        assert_eq!(
            client.api_url("grant_request/42"),
            "https://acme.fluxx.io/api/rest/v2/grant_request/42"
        );
        assert_eq!(
            client.api_url("/user"),
            "https://acme.fluxx.io/api/rest/v2/user"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = FluxxClient::new("https://acme.fluxx.io/api/rest/v2", "secret-token").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_get_json_sends_query_and_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/rest/v2/user/3"))
            .and(header("Authorization", "Bearer token123"))
            .and(query_param("style", "full"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"id": 3}
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let body: serde_json::Value = client
            .get_json(
                &client.api_url("user/3"),
                &[("style".to_string(), "full".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(body["user"]["id"], 3);
    }

    #[tokio::test]
    async fn test_put_form_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/rest/v2/organization/8"))
            .and(body_string_contains("cols="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organization": {"id": 8, "name": "B"}
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let body: serde_json::Value = client
            .put_form_json(
                &client.api_url("organization/8"),
                [("cols", r#"["name"]"#), ("data", r#"{"name":"B"}"#)],
            )
            .await
            .unwrap();

        assert_eq!(body["organization"]["name"], "B");
    }

    #[tokio::test]
    async fn test_delete_json_empty_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/rest/v2/user/9"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server.uri());
        let body: serde_json::Value = client.delete_json(&client.api_url("user/9")).await.unwrap();
        assert!(body.is_null());
    }
}
