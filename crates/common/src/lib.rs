//! Common building blocks shared across ProductDesk crates.
//!
//! - `time`: injectable clocks
//! - `resilience`: circuit breaker and retry executor
//! - `auth`: client-credentials token types and cache

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod resilience;
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{CachedToken, ClientCredentialsConfig, TokenCache, TokenResponse};
pub use resilience::{
    BackoffStrategy, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder,
    CircuitState, Jitter, ResilienceError, ResilienceResult, RetryConfig, RetryConfigBuilder,
    RetryConfigError, RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
pub use time::{Clock, MockClock, SystemClock};
