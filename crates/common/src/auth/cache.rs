//! Shared bearer-token cache
//!
//! Holds at most one [`CachedToken`]. Readers see either the previous token or
//! a fully stored replacement; there is no single-flight refresh, so two
//! callers racing on a cold cache may both fetch.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::types::CachedToken;
use crate::time::{Clock, SystemClock};

/// Explicitly owned token cache
///
/// Clones share the same slot.
#[derive(Debug)]
pub struct TokenCache<C: Clock = SystemClock> {
    slot: Arc<RwLock<Option<CachedToken>>>,
    clock: Arc<C>,
}

impl<C: Clock> Clone for TokenCache<C> {
    fn clone(&self) -> Self {
        Self { slot: Arc::clone(&self.slot), clock: Arc::clone(&self.clock) }
    }
}

impl Default for TokenCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> TokenCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { slot: Arc::new(RwLock::new(None)), clock: Arc::new(clock) }
    }

    /// The clock used for expiry checks
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Cached access token if one exists and has not expired.
    pub fn get(&self) -> Option<String> {
        let now = self.clock.utc_now();
        let guard = self.slot.read();
        match guard.as_ref() {
            Some(token) if token.is_valid_at(now) => Some(token.access_token.clone()),
            Some(_) => {
                debug!("Cached token expired");
                None
            }
            None => None,
        }
    }

    /// Replace the cached token.
    pub fn store(&self, token: CachedToken) {
        *self.slot.write() = Some(token);
    }

    /// Drop the cached token so the next caller fetches a fresh one.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }

    /// Snapshot of the cached token, expired or not.
    pub fn current(&self) -> Option<CachedToken> {
        self.slot.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::auth::types::TokenResponse;
    use crate::time::MockClock;

    fn token(clock: &MockClock, lifetime: i64) -> CachedToken {
        CachedToken::from_response(
            TokenResponse {
                access_token: "tok".into(),
                token_type: "Bearer".into(),
                expires_in: lifetime,
            },
            clock.utc_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_cache_returns_none() {
        let cache = TokenCache::with_clock(MockClock::new());
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn returns_token_until_expiry() {
        let clock = MockClock::new();
        let cache = TokenCache::with_clock(clock.clone());
        cache.store(token(&clock, 60));

        clock.advance_secs(59);
        assert_eq!(cache.get().as_deref(), Some("tok"));

        clock.advance_secs(1);
        assert_eq!(cache.get(), None);
        assert!(cache.current().is_some(), "expired token stays until replaced");
    }

    #[test]
    fn clones_share_slot_and_invalidate_clears() {
        let clock = MockClock::new();
        let cache = TokenCache::with_clock(clock.clone());
        let other = cache.clone();

        other.store(token(&clock, 60));
        assert_eq!(cache.get().as_deref(), Some("tok"));

        cache.invalidate();
        assert_eq!(other.get(), None);
        assert_eq!(
            token(&clock, 10).expires_at - clock.utc_now(),
            TimeDelta::seconds(10)
        );
    }
}
