//! OAuth 2.0 client-credentials support
//!
//! - **[`types`]**: token endpoint wire types and client-credentials settings
//! - **[`cache`]**: the shared, clock-driven bearer-token cache
//!
//! The HTTP exchange itself lives in `productdesk-infra`; this module stays
//! free of network I/O so it can be tested with a [`MockClock`].
//!
//! [`MockClock`]: crate::time::MockClock

pub mod cache;
pub mod types;

pub use cache::TokenCache;
pub use types::{CachedToken, ClientCredentialsConfig, TokenResponse, CLIENT_CREDENTIALS_GRANT};
