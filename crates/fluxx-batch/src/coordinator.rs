//! Batch coordinator: connects sessions, runs the worker pool, collects and
//! orders outcomes.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::api::Connector;
use crate::error::{Error, ErrorKind, Result};
use crate::operation::Operation;
use crate::outcome::{Outcome, Progress};
use crate::retry::RetryController;
use crate::worker::{Dispatch, Worker};

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 5;

/// Default interval between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Callback invoked with each progress snapshot.
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Batch configuration.
#[derive(Clone)]
pub struct BatchConfig {
    /// Number of concurrent workers, each with its own session.
    pub workers: usize,
    pub retry: RetryController,
    pub progress_interval: Duration,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("workers", &self.workers)
            .field("retry", &self.retry)
            .field("progress_interval", &self.progress_interval)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retry: RetryController::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            on_progress: None,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_retry(mut self, retry: RetryController) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Receive a progress snapshot on every tick and once at completion.
    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::new(ErrorKind::Config(
                "worker count must be at least 1".to_string(),
            )));
        }
        if self.progress_interval.is_zero() {
            return Err(Error::new(ErrorKind::Config(
                "progress interval must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }

    fn report(&self, progress: &Progress) {
        info!(
            succeeded = progress.succeeded,
            failed = progress.failed,
            total = progress.total,
            percent = format_args!("{:.1}", progress.percent()),
            "Batch progress"
        );
        if let Some(ref callback) = self.on_progress {
            callback(progress);
        }
    }
}

/// Runs batches of operations against sessions from a [`Connector`].
///
/// # Example
///
/// ```rust,ignore
/// use fluxx_batch::{Batch, BatchConfig, FluxxConnector};
///
/// let batch = Batch::new(FluxxConnector::new(credentials), BatchConfig::new().with_workers(8));
/// let outcomes = batch.run(operations).await?;
/// ```
#[derive(Debug)]
pub struct Batch<C> {
    connector: C,
    config: BatchConfig,
}

impl<C: Connector> Batch<C> {
    pub fn new(connector: C, config: BatchConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `operations` to completion and return one outcome per operation,
    /// sorted by index.
    ///
    /// Fails only for invalid configuration or when a session cannot be
    /// connected; individual operation failures are reported as outcomes.
    #[instrument(skip_all, fields(operations = operations.len(), workers = self.config.workers))]
    pub async fn run(&self, operations: Vec<Operation>) -> Result<Vec<Outcome>> {
        self.config.validate()?;

        let total = operations.len();
        if total == 0 {
            debug!("Empty batch");
            return Ok(Vec::new());
        }

        let sessions = try_join_all((0..self.config.workers).map(|_| self.connector.connect()))
            .await?;
        debug!(sessions = sessions.len(), "Sessions connected");

        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, mut output_rx) = mpsc::channel(total);

        for operation in operations {
            input_tx
                .send(Dispatch::new(operation))
                .map_err(|_| Error::new(ErrorKind::Aborted("input channel closed".to_string())))?;
        }

        let input_rx = Arc::new(Mutex::new(input_rx));
        let mut workers = JoinSet::new();
        for (id, session) in sessions.into_iter().enumerate() {
            let worker = Worker::new(
                id,
                session,
                input_rx.clone(),
                input_tx.clone(),
                output_tx.clone(),
                self.config.retry.clone(),
            );
            workers.spawn(worker.run());
        }
        // Workers hold the remaining senders; the batch ends by count.
        drop(input_tx);
        drop(output_tx);

        let period = self.config.progress_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut progress = Progress::new(total);
        let mut outcomes = Vec::with_capacity(total);

        while outcomes.len() < total {
            tokio::select! {
                received = output_rx.recv() => match received {
                    Some(outcome) => {
                        progress.record(&outcome);
                        outcomes.push(outcome);
                    }
                    None => {
                        return Err(Error::new(ErrorKind::Aborted(format!(
                            "all workers exited after {} of {} outcomes",
                            outcomes.len(),
                            total
                        ))));
                    }
                },
                _ = ticker.tick() => self.config.report(&progress),
            }
        }

        workers.abort_all();
        self.config.report(&progress);

        outcomes.sort_by_key(|outcome| outcome.index);
        Ok(outcomes)
    }
}
