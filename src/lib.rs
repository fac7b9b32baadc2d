//! # fluxx-api
//!
//! Fluxx REST API client library for Rust, with a concurrent batch-write
//! engine and the `fluxx-cli` binary.
//!
//! ## Security
//!
//! - Access tokens and client secrets are redacted in Debug output
//! - Tracing skips credential parameters and record payloads
//! - Error messages are sanitized before they reach logs or outcomes
//!
//! ## Crates
//!
//! - **fluxx-client** - HTTP client infrastructure: retry, compression, error classification
//! - **fluxx-auth** - Instance URLs, credentials from the environment, OAuth client credentials
//! - **fluxx-rest** - Record CRUD and listing for any Fluxx model
//! - **fluxx-batch** - Worker-pool batch writes with retry and ordered outcomes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fluxx_api::{ClientConfig, FluxxCredentials, FluxxRestClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads ACME_INSTANCE, ACME_CLIENT and ACME_SECRET
//!     let creds = FluxxCredentials::from_env("acme")?;
//!     let client = FluxxRestClient::connect(&creds, "v2", ClientConfig::default()).await?;
//!
//!     let org = client.get("organization", "42", &["id".into(), "name".into()]).await?;
//!     println!("{}", org["name"]);
//!
//!     Ok(())
//! }
//! ```

pub use fluxx_auth as auth;
pub use fluxx_batch as batch;
pub use fluxx_client as client;
pub use fluxx_rest as rest;

pub use fluxx_auth::{FluxxCredentials, Instance};
pub use fluxx_batch::{Batch, BatchConfig, FluxxConnector, Outcome};
pub use fluxx_client::{ClientConfig, FluxxClient};
pub use fluxx_rest::FluxxRestClient;
