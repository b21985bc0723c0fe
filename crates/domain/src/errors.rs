//! Error types used throughout ProductDesk

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP 404.
const STATUS_NOT_FOUND: u16 = 404;
/// HTTP 408.
const STATUS_REQUEST_TIMEOUT: u16 = 408;

/// Coarse categories used by logging and the resilience layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Token exchange failures
    Authentication,
    /// 5xx / 408 responses from the Products API
    Server,
    /// Other non-2xx responses (4xx)
    Client,
    /// Connection failures and timeouts
    Network,
    /// Circuit breaker rejected the call
    CircuitOpen,
    /// Local problems: config, (de)serialization, missing records in the fake
    Local,
}

/// Main error type for ProductDesk
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductDeskError {
    /// The client-credentials token exchange failed (non-2xx or malformed body)
    #[error("Authentication failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Auth { status: Option<u16>, message: String },

    /// The Products API answered with a non-success status
    #[error("Products API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// A record addressed by id does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure before any response was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// The circuit breaker rejected the call without touching the network
    #[error("Circuit breaker is open, rejecting calls")]
    CircuitOpen,

    /// A response body could not be decoded, or a request body encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProductDeskError {
    /// Shorthand for an `Api` error.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api { status, body: body.into() }
    }

    /// Shorthand for an `Auth` error.
    pub fn auth(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Auth { status, message: message.into() }
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Auth { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether this is an `Api` error carrying a 404.
    pub fn is_not_found_status(&self) -> bool {
        matches!(self, Self::Api { status: STATUS_NOT_FOUND, .. })
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Auth { .. } => ErrorCategory::Authentication,
            Self::Api { status, .. }
                if *status >= 500 || *status == STATUS_REQUEST_TIMEOUT =>
            {
                ErrorCategory::Server
            }
            Self::Api { .. } => ErrorCategory::Client,
            Self::Transport(_) => ErrorCategory::Network,
            Self::CircuitOpen => ErrorCategory::CircuitOpen,
            Self::NotFound(_) | Self::Serialization(_) | Self::Config(_) => ErrorCategory::Local,
        }
    }

    /// Transient failures are the ones the circuit breaker counts: network
    /// errors, 5xx and 408.
    pub fn is_transient(&self) -> bool {
        matches!(self.category(), ErrorCategory::Server | ErrorCategory::Network)
    }

    /// Retryable failures: every transient failure plus 404.
    ///
    /// A genuine 404 is therefore reported only after the full backoff
    /// schedule.
    pub fn is_retryable(&self) -> bool {
        self.is_transient() || self.is_not_found_status()
    }

    /// Stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::Api { .. } => "api",
            Self::NotFound(_) => "not_found",
            Self::Transport(_) => "transport",
            Self::CircuitOpen => "circuit_open",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
        }
    }
}

/// Result type alias for ProductDesk operations
pub type Result<T> = std::result::Result<T, ProductDeskError>;
