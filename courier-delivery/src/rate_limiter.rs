//! Fixed-window rate limiting of completed sends.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::DeliveryError;

/// Configuration for the fixed-window rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Number of completed sends allowed per window.
    ///
    /// Default: 5
    #[serde(default = "default_budget")]
    pub budget: u32,

    /// Window length in milliseconds.
    ///
    /// Default: 60 000 (one minute)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            window_ms: default_window_ms(),
        }
    }
}

const fn default_budget() -> u32 {
    5
}

const fn default_window_ms() -> u64 {
    60_000
}

#[derive(Debug)]
struct WindowState {
    /// Sends completed since the window last rolled over.
    completed: u32,
    /// When the current window expires.
    resets_at: Instant,
}

/// Fixed-window limiter over *completed sends*, not accepted requests.
///
/// [`check`](Self::check) runs synchronously at submission time so an
/// exhausted caller gets an immediate rejection instead of a stalled queue
/// entry; the counter only advances through
/// [`record_completion`](Self::record_completion) when a delivery actually
/// succeeds. A failed check never consumes budget.
#[derive(Debug)]
pub struct RateLimiter {
    budget: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_millis(config.window_ms);
        Self {
            budget: config.budget,
            window,
            state: Mutex::new(WindowState {
                completed: 0,
                resets_at: Instant::now() + window,
            }),
        }
    }

    /// Check whether another send may be accepted in the current window.
    ///
    /// Rolls the window forward when it has expired.
    ///
    /// # Errors
    ///
    /// Fails with [`DeliveryError::RateLimitExceeded`] when the budget for
    /// the current window is already spent.
    pub fn check(&self) -> Result<(), DeliveryError> {
        let mut state = self.state.lock();

        let now = Instant::now();
        if now > state.resets_at {
            state.completed = 0;
            state.resets_at = now + self.window;
        }

        if state.completed >= self.budget {
            tracing::debug!(
                budget = self.budget,
                completed = state.completed,
                "Rate limit exceeded"
            );
            return Err(DeliveryError::RateLimitExceeded);
        }

        Ok(())
    }

    /// Count one completed send against the current window.
    pub fn record_completion(&self) {
        let mut state = self.state.lock();
        state.completed = state.completed.saturating_add(1);
    }

    /// Sends completed in the current window.
    #[must_use]
    pub fn completed(&self) -> u32 {
        self.state.lock().completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn budget_applies_to_completed_sends_only() {
        let limiter = RateLimiter::new(&RateLimitConfig::default());

        // Checks alone never consume budget.
        for _ in 0..20 {
            assert!(limiter.check().is_ok());
        }

        for _ in 0..5 {
            limiter.record_completion();
        }

        assert_eq!(limiter.check(), Err(DeliveryError::RateLimitExceeded));
        // The failed check did not advance the counter.
        assert_eq!(limiter.completed(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn window_expiry_resets_the_counter() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            budget: 2,
            window_ms: 1_000,
        });

        limiter.record_completion();
        limiter.record_completion();
        assert!(limiter.check().is_err());

        tokio::time::advance(Duration::from_millis(1_001)).await;

        assert!(limiter.check().is_ok());
        assert_eq!(limiter.completed(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn window_does_not_reset_early() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            budget: 1,
            window_ms: 1_000,
        });

        limiter.record_completion();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(limiter.check().is_err());
    }
}
