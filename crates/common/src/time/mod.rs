//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock clocks shared by the resilience and auth
//!   modules

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
