//! # fluxx-client
//!
//! Core HTTP client infrastructure for the Fluxx REST API.
//!
//! This crate provides the foundational HTTP client with:
//! - Automatic retry with configurable backoff and jitter
//! - Compression support (gzip, deflate)
//! - Rate limit detection and `Retry-After` handling
//! - Fluxx error-body decoding (`{"error": {"code", "message"}}`)
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (fluxx-rest, fluxx-batch)                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FluxxClient                            │
//! │  - Holds API base URL + bearer token + HTTP client          │
//! │  - Provides typed helpers (get_json, post_form, ...)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FluxxHttpClient                          │
//! │  - Raw HTTP with retry, compression, rate limiting          │
//! │  - Transient/permanent failure classification               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use fluxx_client::FluxxClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluxx_client::Error> {
//!     let client = FluxxClient::new("https://acme.fluxx.io/api/rest/v2", "token")?;
//!
//!     let body: serde_json::Value = client
//!         .get_json(&client.api_url("grant_request/42"), &[("cols".into(), "[\"id\"]".into())])
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod fluxx_client;
mod request;
mod response;
mod retry;
pub mod security;

pub use client::FluxxHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, CompressionConfig};
pub use error::{Error, ErrorKind, Result};
pub use fluxx_client::FluxxClient;
pub use request::{RequestBuilder, RequestMethod};
pub use response::{fluxx_api_error, Response, ResponseExt};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};

/// Default Fluxx REST API version.
pub const DEFAULT_API_VERSION: &str = "v2";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("fluxx-api/", env!("CARGO_PKG_VERSION"));
