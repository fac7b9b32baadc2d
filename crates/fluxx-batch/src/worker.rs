//! Batch worker: pulls operations, calls the remote API, reports outcomes.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

use crate::api::{RecordApi, RemoteError};
use crate::operation::{Operation, OperationKind, RecordId};
use crate::outcome::Outcome;
use crate::retry::{RetryController, RetryDecision};

/// An operation on the input channel with its transient failure count.
#[derive(Debug, Clone)]
pub(crate) struct Dispatch {
    pub operation: Operation,
    pub failures: u32,
}

impl Dispatch {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            failures: 0,
        }
    }
}

/// Input receiver shared by every worker of a batch.
pub(crate) type SharedReceiver = Arc<Mutex<mpsc::UnboundedReceiver<Dispatch>>>;

pub(crate) struct Worker<S> {
    id: usize,
    session: S,
    input: SharedReceiver,
    requeue: mpsc::UnboundedSender<Dispatch>,
    output: mpsc::Sender<Outcome>,
    retry: RetryController,
}

impl<S: RecordApi> Worker<S> {
    pub fn new(
        id: usize,
        session: S,
        input: SharedReceiver,
        requeue: mpsc::UnboundedSender<Dispatch>,
        output: mpsc::Sender<Outcome>,
        retry: RetryController,
    ) -> Self {
        Self {
            id,
            session,
            input,
            requeue,
            output,
            retry,
        }
    }

    /// Process operations until the input channel closes or the collector
    /// goes away.
    pub async fn run(self) {
        loop {
            let next = { self.input.lock().await.recv().await };
            let Some(dispatch) = next else {
                break;
            };

            if let Some(outcome) = self.process(dispatch).await {
                if self.output.send(outcome).await.is_err() {
                    break;
                }
            }
        }
    }

    /// Handle one dispatch. Returns `None` when the operation was re-queued.
    async fn process(&self, dispatch: Dispatch) -> Option<Outcome> {
        let Dispatch {
            operation,
            failures,
        } = dispatch;
        let index = operation.index;

        let result = AssertUnwindSafe(execute(&self.session, &operation))
            .catch_unwind()
            .await;

        let err = match result {
            Ok(Ok(id)) => {
                info!(
                    worker = self.id,
                    model = %operation.model,
                    index,
                    id = %id,
                    kind = %operation.kind,
                    "Operation succeeded"
                );
                return Some(Outcome::success(index, id));
            }
            Ok(Err(err)) => err,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    worker = self.id,
                    model = %operation.model,
                    index,
                    panic = %message,
                    "Operation panicked"
                );
                return Some(Outcome::failure(
                    index,
                    format!("unexpected error: {message}"),
                ));
            }
        };

        if !err.is_transient() {
            warn!(
                worker = self.id,
                model = %operation.model,
                index,
                error = %err,
                "Operation failed"
            );
            return Some(Outcome::failure(index, err.message));
        }

        let failures = failures.saturating_add(1);
        match self.retry.decide(failures, &err) {
            RetryDecision::Retry(delay) => {
                warn!(
                    worker = self.id,
                    model = %operation.model,
                    index,
                    attempt = failures,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;

                let dispatch = Dispatch {
                    operation,
                    failures,
                };
                match self.requeue.send(dispatch) {
                    Ok(()) => None,
                    Err(mpsc::error::SendError(dispatch)) => Some(Outcome::failure(
                        dispatch.operation.index,
                        format!("could not re-queue operation: {}", err.message),
                    )),
                }
            }
            RetryDecision::Exhausted => {
                let message = RetryController::exhausted_message(failures, &err);
                warn!(
                    worker = self.id,
                    model = %operation.model,
                    index,
                    error = %message,
                    "Operation failed"
                );
                Some(Outcome::failure(index, message))
            }
        }
    }
}

/// Dispatch an operation by kind.
async fn execute<S: RecordApi>(
    session: &S,
    operation: &Operation,
) -> Result<RecordId, RemoteError> {
    let model = operation.model.as_str();

    match &operation.kind {
        OperationKind::Create => {
            let record = session.create(model, &operation.payload).await?;
            returned_id(&record)
        }
        OperationKind::Update => {
            let id = required_id(operation)?;
            let record = session.update(model, id, &operation.payload).await?;
            returned_id(&record)
        }
        OperationKind::Delete => {
            let id = required_id(operation)?;
            session.delete(model, id).await?;
            Ok(id.clone())
        }
        OperationKind::Unsupported(_) => Err(RemoteError::permanent("operation not implemented")),
    }
}

/// The `id` of a record echoed back by a create or update.
///
/// A response without one means Fluxx did not return the record under the
/// model key, so the write cannot be confirmed.
fn returned_id(record: &Value) -> Result<RecordId, RemoteError> {
    record
        .get("id")
        .and_then(RecordId::from_value)
        .ok_or_else(|| RemoteError::permanent("response did not include a record id"))
}

fn required_id(operation: &Operation) -> Result<&RecordId, RemoteError> {
    operation.record_id.as_ref().ok_or_else(|| {
        RemoteError::permanent(format!("{} requires a record id", operation.kind))
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
