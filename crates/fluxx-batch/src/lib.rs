//! # fluxx-batch
//!
//! Concurrent batch writes against the Fluxx REST API.
//!
//! A batch is a list of create, update and delete operations on one model.
//! A fixed pool of workers, each holding its own authenticated session, pulls
//! operations from a shared queue. Transient failures are re-queued after a
//! backoff delay; permanent failures become failed outcomes. The batch
//! returns exactly one [`Outcome`] per operation, sorted by input index.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fluxx_auth::FluxxCredentials;
//! use fluxx_batch::{parse_input, Batch, BatchConfig, FluxxConnector, KindSelection};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let creds = FluxxCredentials::from_env("acme")?;
//!     let operations = parse_input(
//!         r#"[{"name": "A"}, {"id": 5, "name": "B"}, {"id": 7, "method": "DELETE"}]"#,
//!         "organization",
//!         &KindSelection::Infer,
//!     )?;
//!
//!     let batch = Batch::new(FluxxConnector::new(creds), BatchConfig::new().with_workers(2));
//!     for outcome in batch.run(operations).await? {
//!         println!("{}", serde_json::to_string(&outcome)?);
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod coordinator;
mod error;
mod input;
mod operation;
mod outcome;
mod retry;
mod worker;

#[cfg(test)]
mod mock;

pub use api::{Connector, FailureKind, FluxxConnector, RecordApi, RemoteError};
pub use coordinator::{
    Batch, BatchConfig, ProgressCallback, DEFAULT_PROGRESS_INTERVAL, DEFAULT_WORKERS,
};
pub use error::{Error, ErrorKind, Result};
pub use input::{operations_from_value, parse_input, KindSelection, ID_FIELD, METHOD_FIELD};
pub use operation::{Operation, OperationKind, Record, RecordId};
pub use outcome::{Outcome, Progress};
pub use retry::{RetryController, RetryDecision, DEFAULT_MAX_RETRY_DELAY, DEFAULT_RETRY_DELAY};

pub use fluxx_client::BackoffStrategy;
