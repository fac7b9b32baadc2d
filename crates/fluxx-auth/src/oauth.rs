//! OAuth 2.0 client-credentials flow.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::credentials::FluxxCredentials;
use crate::error::{Error, ErrorKind, Result};

/// OAuth client for exchanging client credentials for an access token.
#[derive(Debug, Clone, Default)]
pub struct OAuthClient {
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Create a new OAuth client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing reqwest client (shares its connection pool).
    pub fn with_http_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// Request an access token with the client-credentials grant.
    ///
    /// The credentials are not logged.
    #[instrument(skip(self, credentials), fields(instance = %credentials.instance().name()))]
    pub async fn client_credentials(&self, credentials: &FluxxCredentials) -> Result<TokenResponse> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id()),
            ("client_secret", credentials.client_secret()),
        ];
        let body = serde_urlencoded::to_string(params)?;

        let response = self
            .http_client
            .post(credentials.instance().token_url())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        self.handle_token_response(response).await
    }

    /// Handle a token response, checking for errors.
    ///
    /// Fluxx answers failed grants with an OAuth error body, so the body is
    /// inspected before the status.
    async fn handle_token_response(&self, response: reqwest::Response) -> Result<TokenResponse> {
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), "Token response received");

        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(Error::new(ErrorKind::Http(format!(
                    "token request failed with status {}: {}",
                    status.as_u16(),
                    fluxx_client::security::sanitize_message(&text)
                ))))
            }
        };

        if value.get("access_token").and_then(|v| v.as_str()).is_some() {
            let token: TokenResponse = serde_json::from_value(value)?;
            return Ok(token);
        }

        let error: OAuthErrorResponse = serde_json::from_value(value).unwrap_or_default();
        let description = error
            .error_description
            .or(error.error)
            .unwrap_or_else(|| format!("no access token in response (status {})", status.as_u16()));

        Err(Error::new(ErrorKind::OAuth(
            fluxx_client::security::sanitize_message(&description),
        )))
    }
}

/// Token response from the OAuth endpoint.
///
/// The access token is redacted in Debug output.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (usually "bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Scopes granted.
    #[serde(default)]
    pub scope: Option<String>,
    /// Issued-at timestamp.
    #[serde(default)]
    pub created_at: Option<u64>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// OAuth error response.
#[derive(Debug, Default, Deserialize)]
struct OAuthErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}
