//! Shared application state.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{clock::DefaultClock, state::InMemoryState, state::NotKeyed, Quota, RateLimiter};

use notegraph_core::{Error, Result};

use crate::config::RateLimitConfig;
use crate::services::{AuthService, NoteService};

/// Global rate limiter type (direct quota, no per-client buckets).
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub notes: NoteService,
    /// None if rate limiting is disabled.
    pub rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

impl AppState {
    pub fn new(auth: AuthService, notes: NoteService) -> Self {
        Self {
            auth,
            notes,
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<GlobalRateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }
}

/// Limiter allowing `requests` per `period_secs`, refilled evenly.
pub fn build_rate_limiter(config: &RateLimitConfig) -> Result<Arc<GlobalRateLimiter>> {
    let burst = NonZeroU32::new(config.requests)
        .ok_or_else(|| Error::Config("Rate limit must be non-zero".to_string()))?;
    let interval = Duration::from_secs(config.period_secs) / config.requests;
    let quota = Quota::with_period(interval)
        .ok_or_else(|| Error::Config("Rate limit period must be non-zero".to_string()))?
        .allow_burst(burst);
    Ok(Arc::new(RateLimiter::direct(quota)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_allows_burst_then_blocks() {
        let limiter = build_rate_limiter(&RateLimitConfig {
            requests: 3,
            period_secs: 60,
        })
        .unwrap();
        for _ in 0..3 {
            assert!(limiter.check().is_ok());
        }
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_rate_limiter_rejects_zero() {
        assert!(build_rate_limiter(&RateLimitConfig {
            requests: 0,
            period_secs: 60,
        })
        .is_err());
    }
}
