//! Fluxx REST API client.
//!
//! This client wraps `FluxxClient` from `fluxx-client` and maps the record
//! endpoints (`{api}{model}` and `{api}{model}/{id}`) to typed methods.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use fluxx_auth::{FluxxCredentials, OAuthClient};
use fluxx_client::security::{encode_path_segment, is_safe_model_name};
use fluxx_client::{ClientConfig, FluxxClient};

use crate::error::{Error, ErrorKind, Result};
use crate::options::{ListOptions, Style};
use crate::response::parse_response;
use crate::write::format_write_request;

/// Fluxx REST API client.
///
/// Records are plain JSON objects. Writes normalise column names before
/// sending; reads return whatever Fluxx returns under the model's record key.
///
/// # Example
///
/// ```rust,ignore
/// use fluxx_rest::{FluxxRestClient, ListOptions};
///
/// let client = FluxxRestClient::new("https://acme.fluxx.io/api/rest/v2", token)?;
///
/// let created = client.create("organization", &record).await?;
/// let page = client
///     .list("organization", &ListOptions::new().with_cols(["id", "name"]))
///     .await?;
/// client.delete("organization", "42").await?;
/// ```
#[derive(Debug, Clone)]
pub struct FluxxRestClient {
    client: FluxxClient,
    style: Style,
}

impl FluxxRestClient {
    /// Create a new REST client for an API root and access token.
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = FluxxClient::new(api_url, access_token)?;
        Ok(Self::from_client(client))
    }

    /// Create a new REST client with custom HTTP configuration.
    pub fn with_config(
        api_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = FluxxClient::with_config(api_url, access_token, config)?;
        Ok(Self::from_client(client))
    }

    /// Create a REST client from an existing FluxxClient.
    pub fn from_client(client: FluxxClient) -> Self {
        Self {
            client,
            style: Style::default(),
        }
    }

    /// Authenticate with the client-credentials grant and build a client for
    /// the given API version.
    #[instrument(skip(credentials, config), fields(instance = %credentials.instance().name()))]
    pub async fn connect(
        credentials: &FluxxCredentials,
        version: &str,
        config: ClientConfig,
    ) -> Result<Self> {
        let token = OAuthClient::new().client_credentials(credentials).await?;
        let api_url = credentials.instance().api_url(version);
        debug!(api_url = %api_url, "Authenticated");
        Self::with_config(api_url, token.access_token, config)
    }

    /// Set the response style used by [`get`](Self::get).
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Get the underlying FluxxClient.
    pub fn inner(&self) -> &FluxxClient {
        &self.client
    }

    pub fn api_url(&self) -> &str {
        self.client.base_url()
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Create a record and return it as Fluxx echoes it back.
    #[instrument(skip(self, data))]
    pub async fn create(&self, model: &str, data: &Map<String, Value>) -> Result<Value> {
        let url = self.model_url(model)?;
        let fields = format_write_request(data)?;

        let body: Value = self
            .client
            .post_form_json(&url, fields)
            .await
            .map_err(|e| Error::from_client(e, model, "POST"))?;
        parse_response(body, model, "POST")
    }

    /// Update a record and return it.
    #[instrument(skip(self, data))]
    pub async fn update(&self, model: &str, id: &str, data: &Map<String, Value>) -> Result<Value> {
        let url = self.record_url(model, id)?;
        let fields = format_write_request(data)?;

        let body: Value = self
            .client
            .put_form_json(&url, fields)
            .await
            .map_err(|e| Error::from_client(e, model, "PUT"))?;
        parse_response(body, model, "PUT")
    }

    /// Delete a record.
    ///
    /// Succeeds on any 2xx response without an `error` object.
    #[instrument(skip(self))]
    pub async fn delete(&self, model: &str, id: &str) -> Result<()> {
        let url = self.record_url(model, id)?;

        let body: Value = self
            .client
            .delete_json(&url)
            .await
            .map_err(|e| Error::from_client(e, model, "DELETE"))?;
        parse_response(body, model, "DELETE")?;
        Ok(())
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Fetch a single record with the client's style.
    pub async fn get(&self, model: &str, id: &str, cols: &[String]) -> Result<Value> {
        self.get_with_style(model, id, cols, self.style).await
    }

    /// Fetch a single record with an explicit style.
    ///
    /// An empty column list requests `["id"]`.
    #[instrument(skip(self, cols))]
    pub async fn get_with_style(
        &self,
        model: &str,
        id: &str,
        cols: &[String],
        style: Style,
    ) -> Result<Value> {
        let url = self.record_url(model, id)?;
        let cols = if cols.is_empty() {
            serde_json::to_string(&["id"])?
        } else {
            serde_json::to_string(cols)?
        };
        let query = [
            ("cols".to_string(), cols),
            ("style".to_string(), style.to_string()),
        ];

        let body: Value = self
            .client
            .get_json(&url, &query)
            .await
            .map_err(|e| Error::from_client(e, model, "GET"))?;
        parse_response(body, model, "GET")
    }

    /// List one page of records.
    #[instrument(skip(self, options), fields(page = options.page, per_page = options.per_page))]
    pub async fn list(&self, model: &str, options: &ListOptions) -> Result<Value> {
        let query = options.to_query()?;
        let url = self.model_url(model)?;

        let body: Value = self
            .client
            .get_json(&url, &query)
            .await
            .map_err(|e| Error::from_client(e, model, "GET"))?;
        parse_response(body, model, "GET")
    }

    fn model_url(&self, model: &str) -> Result<String> {
        if !is_safe_model_name(model) {
            return Err(Error::new(ErrorKind::InvalidModel(model.to_string())));
        }
        Ok(self.client.api_url(model))
    }

    fn record_url(&self, model: &str, id: &str) -> Result<String> {
        let base = self.model_url(model)?;
        Ok(format!("{}/{}", base, encode_path_segment(id)))
    }
}
