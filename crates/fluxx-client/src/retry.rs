//! Retry policy with configurable backoff and jitter.
//!
//! [`BackoffStrategy`] is shared with the batch engine, which applies it
//! across re-enqueued operations rather than within a single request.

use rand::Rng;
use std::time::Duration;

/// Configuration for in-request retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_attempts: u32,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff strategy to use.
    pub backoff: BackoffStrategy,
    /// Whether to respect Retry-After headers.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retry attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay ceiling.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff strategy.
    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackoffStrategy {
    /// Constant delay between retries.
    Constant,
    /// Linear increase in delay (delay * attempt).
    Linear,
    /// Exponential increase in delay (delay * factor^attempt).
    Exponential { factor: f64 },
    /// Exponential with random jitter to avoid thundering herd.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Calculate the delay for a given attempt number (0-indexed), capped at `max_delay`.
    pub fn delay(&self, attempt: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = match self {
            BackoffStrategy::Constant => initial_delay,
            BackoffStrategy::Linear => initial_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffStrategy::Exponential { factor } => {
                scaled(initial_delay, factor.powi(exponent), max_delay)
            }
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base = scaled(initial_delay, factor.powi(exponent), max_delay);
                // jitter in [0, base)
                let jitter = rand::rng().random::<f64>() * base.as_secs_f64();
                base + Duration::from_secs_f64(jitter)
            }
        };

        std::cmp::min(delay, max_delay)
    }
}

fn scaled(delay: Duration, multiplier: f64, ceiling: Duration) -> Duration {
    let secs = delay.as_secs_f64() * multiplier;
    if !secs.is_finite() || secs >= ceiling.as_secs_f64() {
        ceiling
    } else {
        Duration::from_secs_f64(secs)
    }
}

/// Retry policy that determines when and how to retry a single request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    attempt: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Returns the current attempt number (0-indexed).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns true if we should retry after a failure.
    pub fn should_retry(&self) -> bool {
        self.attempt < self.config.max_attempts
    }

    /// Record an attempt and return the delay before the next retry.
    /// Returns None if we've exhausted all retries.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }

        let delay = match retry_after {
            Some(hint) if self.config.respect_retry_after => {
                std::cmp::min(hint, self.config.max_delay)
            }
            _ => self.config.backoff.delay(
                self.attempt,
                self.config.initial_delay,
                self.config.max_delay,
            ),
        };

        self.attempt += 1;
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_never_retries() {
        let mut policy = RetryPolicy::new(RetryConfig::default().with_max_attempts(0));
        assert!(!policy.should_retry());
        assert_eq!(policy.next_delay(Some(Duration::from_secs(1))), None);
    }

    #[test]
    fn test_constant_backoff() {
        let strategy = BackoffStrategy::Constant;
        let initial = Duration::from_secs(60);
        let max = Duration::from_secs(600);

        assert_eq!(strategy.delay(0, initial, max), Duration::from_secs(60));
        assert_eq!(strategy.delay(9, initial, max), Duration::from_secs(60));
    }

    #[test]
    fn test_linear_backoff() {
        let strategy = BackoffStrategy::Linear;
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(5);

        assert_eq!(strategy.delay(0, initial, max), Duration::from_secs(1));
        assert_eq!(strategy.delay(2, initial, max), Duration::from_secs(3));
        assert_eq!(strategy.delay(10, initial, max), Duration::from_secs(5));
    }

    #[test]
    fn test_exponential_backoff() {
        let strategy = BackoffStrategy::Exponential { factor: 2.0 };
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        assert_eq!(strategy.delay(0, initial, max), Duration::from_secs(1));
        assert_eq!(strategy.delay(1, initial, max), Duration::from_secs(2));
        assert_eq!(strategy.delay(3, initial, max), Duration::from_secs(8));
        assert_eq!(strategy.delay(10, initial, max), Duration::from_secs(60));
        assert_eq!(strategy.delay(5000, initial, max), Duration::from_secs(60));
    }

    #[test]
    fn test_exponential_with_jitter() {
        let strategy = BackoffStrategy::ExponentialWithJitter { factor: 2.0 };
        let initial = Duration::from_secs(1);
        let max = Duration::from_secs(60);

        let delay = strategy.delay(1, initial, max);
        assert!(delay >= Duration::from_secs(2));
        assert!(delay <= Duration::from_secs(4));
    }

    #[test]
    fn test_retry_policy_exhausts() {
        let config = RetryConfig::default()
            .with_max_attempts(2)
            .with_backoff(BackoffStrategy::Constant)
            .with_initial_delay(Duration::from_millis(10));
        let mut policy = RetryPolicy::new(config);

        assert_eq!(policy.next_delay(None), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_delay(None), Some(Duration::from_millis(10)));
        assert_eq!(policy.attempt(), 2);
        assert!(policy.next_delay(None).is_none());
    }

    #[test]
    fn test_retry_after_is_capped() {
        let config = RetryConfig::default().with_max_delay(Duration::from_secs(60));
        let mut policy = RetryPolicy::new(config);

        let delay = policy.next_delay(Some(Duration::from_secs(30))).unwrap();
        assert_eq!(delay, Duration::from_secs(30));

        let delay = policy.next_delay(Some(Duration::from_secs(120))).unwrap();
        assert_eq!(delay, Duration::from_secs(60));
    }
}
