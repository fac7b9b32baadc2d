//! # fluxx-auth
//!
//! Authentication for the Fluxx REST API.
//!
//! ## Security
//!
//! - Client secrets and access tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages are sanitised before they carry server text
//!
//! ## Flow
//!
//! Fluxx uses the OAuth 2.0 client-credentials grant. An instance name is
//! resolved to a base URL, the client id and secret are exchanged for a bearer
//! token at `{base}oauth/token`, and the REST API lives under
//! `{base}api/rest/{version}/`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fluxx_auth::{FluxxCredentials, OAuthClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluxx_auth::Error> {
//!     // Reads ACME_INSTANCE, ACME_CLIENT and ACME_SECRET
//!     let creds = FluxxCredentials::from_env("acme")?;
//!
//!     let token = OAuthClient::new().client_credentials(&creds).await?;
//!     let api_url = creds.instance().api_url("v2");
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod instance;
mod oauth;

pub use credentials::FluxxCredentials;
pub use error::{Error, ErrorKind, Result};
pub use instance::Instance;
pub use oauth::{OAuthClient, TokenResponse};

/// Path of the token endpoint, relative to the instance base URL.
pub const TOKEN_PATH: &str = "oauth/token";
