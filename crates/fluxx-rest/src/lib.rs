//! # fluxx-rest
//!
//! Fluxx REST API client for record CRUD against arbitrary models.
//!
//! ## Features
//!
//! - **Create / Update** - Form-encoded writes with normalised column names
//! - **Delete** - Remove a record by id
//! - **Get** - Fetch one record with selected columns and response style
//! - **List** - Page through records with optional filters
//!
//! ## Example
//!
//! ```rust,ignore
//! use fluxx_auth::FluxxCredentials;
//! use fluxx_rest::{ClientConfig, FluxxRestClient, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluxx_rest::Error> {
//!     let creds = FluxxCredentials::from_env("acme")?;
//!     let client = FluxxRestClient::connect(&creds, "v2", ClientConfig::default()).await?;
//!
//!     let record = serde_json::json!({"Name": "New Org"});
//!     let created = client
//!         .create("organization", record.as_object().unwrap())
//!         .await?;
//!
//!     let users = client
//!         .list("user", &ListOptions::new().with_cols(["id", "email"]))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod options;
mod response;
mod write;

pub use client::FluxxRestClient;
pub use error::{Error, ErrorKind, Result};
pub use options::{ListOptions, Style};
pub use response::{parse_response, record_key};
pub use write::{format_column_name, format_write_data, format_write_request};

// Re-export fluxx-client types that users might need
pub use fluxx_client::{ClientConfig, ClientConfigBuilder};
