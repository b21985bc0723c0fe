//! Application constants
//!
//! Defaults for the Products API client. Configuration overrides all of them.

// Products API request defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const PRODUCTS_RESOURCE: &str = "Products";

// Retry policy: 5 retries, waiting 2^n seconds before retry n
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_BACKOFF_BASE_SECS: u64 = 2;

// Circuit breaker: open after 5 consecutive transient failures, for 30s
pub const DEFAULT_FAILURE_THRESHOLD: u64 = 5;
pub const DEFAULT_BREAK_DURATION_SECS: u64 = 30;
