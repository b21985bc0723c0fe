//! Resilience patterns for fault tolerance
//!
//! - **Circuit Breaker**: stops calling a dependency after repeated failures
//! - **Retry Logic**: configurable retry strategies with exponential backoff
//!   and optional jitter
//!
//! Both are generic over the guarded operation's error type and know nothing
//! about HTTP. Callers supply the classification (which errors count as
//! breaker failures, which are worth retrying).

pub mod circuit_breaker;
pub mod retry;

// Re-export circuit breaker types
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder,
    CircuitState, ConfigError, ConfigResult, ResilienceError, ResilienceResult,
};
// Re-export retry types
pub use retry::{
    policies, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryConfigError, RetryError,
    RetryExecutor, RetryPolicy, RetryResult,
};
