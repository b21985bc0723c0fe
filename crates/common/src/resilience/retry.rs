//! Generic retry strategy implementation
//!
//! Runs an async operation until it succeeds, the policy declines to retry,
//! or the attempt budget runs out. Delays come from a [`BackoffStrategy`]
//! optionally randomized by [`Jitter`]. The last error is always handed back
//! to the caller inside [`RetryError`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted
    #[error("All retry attempts exhausted after {attempts} tries: {source}")]
    AttemptsExhausted { attempts: u32, source: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {source}")]
    NonRetryable { attempts: u32, source: E },
}

impl<E> RetryError<E> {
    /// The error returned by the last attempt.
    pub fn into_source(self) -> E {
        match self {
            RetryError::AttemptsExhausted { source, .. }
            | RetryError::NonRetryable { source, .. } => source,
        }
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::AttemptsExhausted { attempts, .. }
            | RetryError::NonRetryable { attempts, .. } => *attempts,
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Rejected retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid retry configuration: {message}")]
pub struct RetryConfigError {
    pub message: String,
}

impl RetryConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// `attempt` is the zero-based index of the attempt that just failed.
    fn should_retry(&self, error: &E, attempt: u32) -> bool;
}

/// Backoff strategy for calculating retry delays
///
/// `attempt` is the zero-based index of the retry being scheduled, so the
/// first retry uses `attempt = 0`.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the next delay for the given attempt
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_secs_f64() * base.powi(exponent);
                if !delay.is_finite() || delay >= max_delay.as_secs_f64() {
                    *max_delay
                } else {
                    Duration::from_secs_f64(delay)
                }
            }
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => delay.mul_f64(rand::thread_rng().gen_range(0.0..=1.0)),
            Jitter::Equal => {
                let half = delay / 2;
                half + half.mul_f64(rand::thread_rng().gen_range(0.0..=1.0))
            }
        }
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
}

const MAX_BACKOFF: Duration = Duration::from_secs(3600);

impl Default for RetryConfig {
    /// One initial attempt plus five retries waiting 2, 4, 8, 16 and 32
    /// seconds.
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_secs(2),
                base: 2.0,
                max_delay: MAX_BACKOFF,
            },
            jitter: Jitter::None,
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// `retries` retries after the first attempt; retry `n` (1-based) waits
    /// `base_secs ^ n` seconds.
    ///
    /// # Errors
    /// `base_secs` of zero.
    pub fn exponential_retries(
        retries: u32,
        base_secs: u64,
        jitter: Jitter,
    ) -> Result<Self, RetryConfigError> {
        RetryConfigBuilder::new()
            .max_attempts(retries.saturating_add(1))
            .exponential_backoff(Duration::from_secs(base_secs), base_secs as f64, MAX_BACKOFF)
            .jitter(jitter)
            .build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryConfigError> {
        if self.max_attempts == 0 {
            return Err(RetryConfigError::new("max_attempts must be greater than 0"));
        }

        if let BackoffStrategy::Exponential { base, .. } = &self.backoff {
            if *base <= 0.0 {
                return Err(RetryConfigError::new("exponential base must be greater than 0"));
            }
        }

        Ok(())
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.config.jitter = jitter;
        self
    }

    pub fn build(self) -> Result<RetryConfig, RetryConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    ///
    /// The policy is consulted first: a non-retryable error stops
    /// immediately even on the last attempt.
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(attempt, "Executing operation");

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !self.policy.should_retry(&error, attempt - 1) {
                debug!(attempt, error = %error, "Retry policy declined to retry");
                return Err(RetryError::NonRetryable { attempts: attempt, source: error });
            }

            if attempt >= self.config.max_attempts {
                warn!(attempts = attempt, error = %error, "All retry attempts exhausted");
                return Err(RetryError::AttemptsExhausted { attempts: attempt, source: error });
            }

            let delay = self.config.jitter.apply(self.config.backoff.calculate_delay(attempt - 1));
            warn!(attempt, ?delay, error = %error, "Operation failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Pre-defined retry policies
pub mod policies {
    use super::RetryPolicy;

    /// Retries exactly the errors `predicate` accepts
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E) -> bool,
    {
        fn should_retry(&self, error: &E, _attempt: u32) -> bool {
            (self.predicate)(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::policies::PredicateRetry;
    use super::*;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::builder()
            .max_attempts(max_attempts)
            .fixed_backoff(Duration::from_millis(1))
            .build()
            .expect("Should build valid config")
    }

    fn always(_: &&str) -> bool {
        true
    }

    #[test]
    fn test_backoff_strategy_fixed() {
        let strategy = BackoffStrategy::Fixed(Duration::from_millis(100));

        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(5), Duration::from_millis(100));
    }

    #[test]
    fn test_backoff_strategy_exponential() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay: Duration::from_millis(100),
            base: 2.0,
            max_delay: Duration::from_secs(10),
        };

        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(strategy.calculate_delay(3), Duration::from_millis(800));
        assert_eq!(strategy.calculate_delay(20), Duration::from_secs(10));
    }

    #[test]
    fn test_default_schedule_is_two_to_the_n_seconds() {
        let config = RetryConfig::default();
        let delays: Vec<u64> =
            (0..5).map(|n| config.backoff.calculate_delay(n).as_secs()).collect();

        assert_eq!(config.max_attempts, 6);
        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
        assert_eq!(delays.iter().sum::<u64>(), 62);
        assert_eq!(config.jitter, Jitter::None);
    }

    #[test]
    fn test_exponential_retries_uses_base_as_first_delay() {
        let config = RetryConfig::exponential_retries(3, 3, Jitter::Equal).unwrap();
        let delays: Vec<u64> =
            (0..3).map(|n| config.backoff.calculate_delay(n).as_secs()).collect();

        assert_eq!(config.max_attempts, 4);
        assert_eq!(delays, vec![3, 9, 27]);
        assert_eq!(config.jitter, Jitter::Equal);
    }

    #[test]
    fn test_jitter_bounds() {
        let delay = Duration::from_millis(100);
        assert_eq!(Jitter::None.apply(delay), delay);

        for _ in 0..50 {
            assert!(Jitter::Full.apply(delay) <= delay);
            let equal = Jitter::Equal.apply(delay);
            assert!(equal >= Duration::from_millis(50) && equal <= delay);
        }
    }

    #[test]
    fn test_retry_config_validation() {
        assert!(RetryConfig::builder().max_attempts(0).build().is_err());
        assert_eq!(
            RetryConfig::exponential_retries(5, 0, Jitter::None).unwrap_err().message,
            "exponential base must be greater than 0"
        );
    }

    #[tokio::test]
    async fn test_retry_executor_succeeds_after_temporary_failures() {
        let executor = RetryExecutor::new(fast_config(3), PredicateRetry::new(always));
        let counter = Arc::new(AtomicU32::new(0));

        let result = executor
            .execute(|| {
                let c = Arc::clone(&counter);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("temporary failure")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_executor_exhausts_attempts_and_keeps_last_error() {
        let executor = RetryExecutor::new(
            fast_config(3),
            PredicateRetry::new(|_: &String| true),
        );
        let counter = Arc::new(AtomicU32::new(0));

        let result = executor
            .execute(|| {
                let c = Arc::clone(&counter);
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(format!("failure {n}"))
                }
            })
            .await;

        match result {
            Err(RetryError::AttemptsExhausted { attempts, source }) => {
                assert_eq!(attempts, 3);
                assert_eq!(source, "failure 2");
            }
            other => panic!("Expected AttemptsExhausted, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_predicate_policy_stops_on_permanent_error() {
        let policy = PredicateRetry::new(|e: &&str| *e == "transient");
        let executor = RetryExecutor::new(fast_config(5), policy);
        let counter = Arc::new(AtomicU32::new(0));

        let result = executor
            .execute(|| {
                let c = Arc::clone(&counter);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err::<(), _>("transient")
                    } else {
                        Err("permanent")
                    }
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::NonRetryable { .. }));
        assert_eq!(err.attempts(), 2);
        assert_eq!(err.into_source(), "permanent");
    }
}
