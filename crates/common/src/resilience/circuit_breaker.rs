//! Circuit breaker
//!
//! Stops issuing calls to a failing dependency for a cooldown period once a
//! run of consecutive failures reaches a threshold.
//!
//! ```text
//! Closed → Open:      failure_count >= failure_threshold
//! Open → Half-Open:   break_duration elapsed since the circuit opened
//! Half-Open → Closed: success_threshold trial calls succeed
//! Half-Open → Open:   a trial call fails
//! ```
//!
//! Callers decide which errors count as failures through
//! [`CircuitBreaker::execute_with`]; anything else is recorded as a success.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::time::{Clock, SystemClock};

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced by a guarded operation
///
/// Generic over the operation's own error so the original error survives.
#[derive(Debug, Error)]
pub enum ResilienceError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Circuit breaker is open, rejecting calls
    #[error("Circuit breaker is open, rejecting calls")]
    CircuitOpen,

    /// The underlying operation failed
    #[error("Operation failed: {source}")]
    OperationFailed {
        #[source]
        source: E,
    },
}

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

//==============================================================================
// State & Configuration
//==============================================================================

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// Circuit is half-open, allowing limited requests to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u64,
    /// Number of trial successes needed to close the circuit from half-open
    pub success_threshold: u64,
    /// Time to stay open before allowing a trial call
    pub break_duration: Duration,
    /// Maximum number of calls allowed in half-open state
    pub half_open_max_calls: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 1,
            break_duration: Duration::from_secs(30),
            half_open_max_calls: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        if self.success_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "success_threshold must be greater than 0".to_string(),
            });
        }

        if self.half_open_max_calls == 0 {
            return Err(ConfigError::Invalid {
                message: "half_open_max_calls must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn success_threshold(mut self, threshold: u64) -> Self {
        self.config.success_threshold = threshold;
        self
    }

    pub fn break_duration(mut self, duration: Duration) -> Self {
        self.config.break_duration = duration;
        self
    }

    pub fn half_open_max_calls(mut self, max_calls: u64) -> Self {
        self.config.half_open_max_calls = max_calls;
        self
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u64,
    success_count: u64,
    half_open_calls: u64,
    opened_at: Option<Instant>,
}

//==============================================================================
// Circuit Breaker
//==============================================================================

/// Generic circuit breaker
///
/// Cloning is cheap and clones share state, so one breaker can guard a
/// dependency across every task that calls it.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerState>>,
    clock: Arc<C>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &inner.state)
            .field("failure_count", &inner.failure_count)
            .finish()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            inner: Arc::clone(&self.inner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker with the given configuration using system
    /// clock
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock (useful for testing)
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                half_open_calls: 0,
                opened_at: None,
            })),
            clock: Arc::new(clock),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Try to acquire permission for one call.
    ///
    /// Moves an open circuit to half-open once the break duration has
    /// elapsed, and counts half-open trial calls.
    fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock();

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|opened| self.clock.now().saturating_duration_since(opened));
                match elapsed {
                    Some(elapsed) if elapsed >= self.config.break_duration => {
                        inner.state = CircuitState::HalfOpen;
                        inner.half_open_calls = 1;
                        inner.success_count = 0;
                        info!("Circuit breaker half-open, allowing trial call");
                        true
                    }
                    _ => false,
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_calls < self.config.half_open_max_calls {
                    inner.half_open_calls += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Execute an operation, counting only errors for which `is_failure`
    /// returns `true` as failures.
    ///
    /// Errors that are not failures are still returned to the caller, but the
    /// breaker records them as successes. An operation dropped before it
    /// completes records nothing and gives back its half-open slot.
    pub async fn execute_with<F, Fut, T, E, P>(
        &self,
        operation: F,
        is_failure: P,
    ) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
        P: Fn(&E) -> bool,
    {
        if !self.try_acquire() {
            debug!(state = %self.state(), "Circuit breaker rejecting call");
            return Err(ResilienceError::CircuitOpen);
        }

        let permit = CallPermit { breaker: self, settled: false };
        let outcome = operation().await;
        permit.settle();

        match outcome {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(error) => {
                if is_failure(&error) {
                    self.record_failure();
                } else {
                    self.record_success();
                }
                Err(ResilienceError::OperationFailed { source: error })
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.success_count += 1;

        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.half_open_calls = 0;
                    inner.opened_at = None;
                    info!(successes = inner.success_count, "Circuit breaker closed");
                }
            }
            CircuitState::Open => {
                debug!("Received success while circuit is open");
            }
        }
    }

    fn record_failure(&self) {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.failure_count += 1;

        match inner.state {
            CircuitState::Closed => {
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(now);
                    warn!(
                        failures = inner.failure_count,
                        break_secs = self.config.break_duration.as_secs(),
                        "Circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                inner.half_open_calls = 0;
                warn!("Circuit breaker re-opened after failed trial call");
            }
            CircuitState::Open => {}
        }
    }

    /// Current state without triggering transitions
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Give back the half-open slot of a call that never finished.
    fn release_abandoned(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen && inner.half_open_calls > 0 {
            inner.half_open_calls -= 1;
            debug!("Trial call abandoned, half-open slot released");
        }
    }
}

/// Outstanding permission for one guarded call.
///
/// Dropping it unsettled (the caller's future was cancelled mid-call) hands
/// the slot back so the breaker cannot stay half-open with no trial running.
struct CallPermit<'a, C: Clock> {
    breaker: &'a CircuitBreaker<C>,
    settled: bool,
}

impl<C: Clock> CallPermit<'_, C> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl<C: Clock> Drop for CallPermit<'_, C> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release_abandoned();
        }
    }
}
