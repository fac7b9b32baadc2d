//! Per-operation retry policy for transient failures.
//!
//! A transiently failed operation is put back on the input channel after a
//! backoff delay. By default retries are unbounded with a fixed 60 second
//! delay; a cap turns exhaustion into a failed outcome.

use std::time::Duration;

use fluxx_client::BackoffStrategy;

use crate::api::RemoteError;

/// Default delay between retries of one operation.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Default ceiling for computed and server-provided delays.
pub const DEFAULT_MAX_RETRY_DELAY: Duration = Duration::from_secs(600);

/// What to do with an operation that just failed transiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the delay, then re-publish the operation.
    Retry(Duration),
    /// Give up; the operation becomes a failed outcome.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryController {
    backoff: BackoffStrategy,
    initial_delay: Duration,
    max_delay: Duration,
    max_retries: Option<u32>,
    respect_retry_after: bool,
}

impl Default for RetryController {
    fn default() -> Self {
        Self {
            backoff: BackoffStrategy::Constant,
            initial_delay: DEFAULT_RETRY_DELAY,
            max_delay: DEFAULT_MAX_RETRY_DELAY,
            max_retries: None,
            respect_retry_after: true,
        }
    }
}

impl RetryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay before the first retry (and every retry with constant backoff).
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Cap the number of retries per operation.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Retry forever (the default).
    pub fn unbounded(mut self) -> Self {
        self.max_retries = None;
        self
    }

    pub fn with_respect_retry_after(mut self, respect: bool) -> Self {
        self.respect_retry_after = respect;
        self
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Decide the fate of an operation that has failed `failures` times in a
    /// row, the latest failure being `err`.
    pub fn decide(&self, failures: u32, err: &RemoteError) -> RetryDecision {
        let retries_done = failures.saturating_sub(1);
        if self.max_retries.is_some_and(|max| retries_done >= max) {
            return RetryDecision::Exhausted;
        }

        let delay = match err.retry_after {
            Some(hint) if self.respect_retry_after => hint.min(self.max_delay),
            _ => self
                .backoff
                .delay(retries_done, self.initial_delay, self.max_delay),
        };
        RetryDecision::Retry(delay)
    }

    /// Failure message for an operation whose retries ran out.
    pub fn exhausted_message(failures: u32, err: &RemoteError) -> String {
        format!("retries exhausted after {failures} attempts: {}", err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_constant_and_unbounded() {
        let controller = RetryController::default();
        let err = RemoteError::transient("503");

        assert_eq!(controller.max_retries(), None);
        assert_eq!(controller.decide(1, &err), RetryDecision::Retry(DEFAULT_RETRY_DELAY));
        assert_eq!(
            controller.decide(10_000, &err),
            RetryDecision::Retry(DEFAULT_RETRY_DELAY)
        );
    }

    #[test]
    fn test_cap() {
        let controller = RetryController::new()
            .with_initial_delay(Duration::from_millis(1))
            .with_max_retries(2);
        let err = RemoteError::transient("timeout");

        assert!(matches!(controller.decide(1, &err), RetryDecision::Retry(_)));
        assert!(matches!(controller.decide(2, &err), RetryDecision::Retry(_)));
        assert_eq!(controller.decide(3, &err), RetryDecision::Exhausted);
    }

    #[test]
    fn test_zero_cap_never_retries() {
        let controller = RetryController::new().with_max_retries(0);
        assert_eq!(
            controller.decide(1, &RemoteError::transient("x")),
            RetryDecision::Exhausted
        );
    }

    #[test]
    fn test_exponential_with_ceiling() {
        let controller = RetryController::new()
            .with_backoff(BackoffStrategy::Exponential { factor: 2.0 })
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5));
        let err = RemoteError::transient("x");

        assert_eq!(controller.decide(1, &err), RetryDecision::Retry(Duration::from_secs(1)));
        assert_eq!(controller.decide(2, &err), RetryDecision::Retry(Duration::from_secs(2)));
        assert_eq!(controller.decide(3, &err), RetryDecision::Retry(Duration::from_secs(4)));
        assert_eq!(controller.decide(4, &err), RetryDecision::Retry(Duration::from_secs(5)));
    }

    #[test]
    fn test_retry_after_hint() {
        let controller = RetryController::new().with_max_delay(Duration::from_secs(30));

        let err = RemoteError::transient("429").with_retry_after(Duration::from_secs(7));
        assert_eq!(controller.decide(1, &err), RetryDecision::Retry(Duration::from_secs(7)));

        let err = RemoteError::transient("429").with_retry_after(Duration::from_secs(90));
        assert_eq!(controller.decide(1, &err), RetryDecision::Retry(Duration::from_secs(30)));

        let controller = controller.with_respect_retry_after(false);
        assert_eq!(controller.decide(1, &err), RetryDecision::Retry(Duration::from_secs(30)));
    }

    #[test]
    fn test_exhausted_message() {
        let err = RemoteError::transient("HTTP error: 503 ");
        assert_eq!(
            RetryController::exhausted_message(3, &err),
            "retries exhausted after 3 attempts: HTTP error: 503 "
        );
    }
}
