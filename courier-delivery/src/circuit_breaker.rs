//! Circuit breaker guarding the provider pool.
//!
//! The breaker counts consecutive terminal delivery failures and opens once
//! the threshold is reached, rejecting further submissions immediately.
//!
//! Recovery is a pluggable policy rather than a hard-coded behavior:
//!
//! - [`RecoveryPolicy::Never`] (the default) reproduces the legacy
//!   semantics: once open, the breaker stays open for the remainder of the
//!   process lifetime. A success can still reset the consecutive-failure
//!   count, but it never closes an open circuit.
//! - [`RecoveryPolicy::Timeout`] adds the conventional half-open probe:
//!   after the timeout one delivery is admitted; its success closes the
//!   circuit, its failure reopens it.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures required to open the circuit.
    ///
    /// Default: 3
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// How (and whether) an open circuit recovers.
    #[serde(default)]
    pub recovery: RecoveryPolicy,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            recovery: RecoveryPolicy::default(),
        }
    }
}

const fn default_max_failures() -> u32 {
    3
}

/// Recovery strategy for an open circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum RecoveryPolicy {
    /// An open circuit never closes again.
    #[default]
    Never,
    /// After `secs`, admit a single probe delivery; close on success,
    /// reopen on failure.
    Timeout { secs: u64 },
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, submissions allowed.
    Closed,
    /// Circuit tripped, submissions rejected.
    Open,
    /// Testing recovery, one probe delivery allowed.
    HalfOpen,
}

#[derive(Debug)]
struct BreakerData {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Tracks consecutive delivery failures for the whole provider pool.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    data: Mutex<BreakerData>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            data: Mutex::new(BreakerData {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Check whether a submission should be allowed through.
    ///
    /// With a timeout recovery policy this is also the transition point from
    /// `Open` to `HalfOpen` once the timeout has elapsed.
    pub fn should_allow(&self) -> bool {
        let mut data = self.data.lock();
        match data.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => match self.config.recovery {
                RecoveryPolicy::Never => false,
                RecoveryPolicy::Timeout { secs } => {
                    let elapsed = data
                        .opened_at
                        .is_some_and(|at| at.elapsed() >= Duration::from_secs(secs));
                    if elapsed {
                        data.state = CircuitState::HalfOpen;
                        tracing::info!("Circuit breaker entering half-open state, probing recovery");
                        true
                    } else {
                        false
                    }
                }
            },
        }
    }

    /// Record a successful delivery.
    ///
    /// Resets the consecutive-failure count. Closes the circuit only from
    /// the half-open probe state; an open circuit under
    /// [`RecoveryPolicy::Never`] stays open.
    pub fn record_success(&self) {
        let mut data = self.data.lock();
        data.consecutive_failures = 0;
        if data.state == CircuitState::HalfOpen {
            data.state = CircuitState::Closed;
            data.opened_at = None;
            tracing::info!("Circuit breaker closed, normal operation resumed");
        }
    }

    /// Record a terminal delivery failure.
    ///
    /// Returns `true` if this failure tripped the circuit open.
    pub fn record_failure(&self) -> bool {
        let mut data = self.data.lock();
        match data.state {
            CircuitState::Closed => {
                data.consecutive_failures = data.consecutive_failures.saturating_add(1);
                if data.consecutive_failures >= self.config.max_failures {
                    data.state = CircuitState::Open;
                    data.opened_at = Some(Instant::now());
                    tracing::warn!(
                        consecutive_failures = data.consecutive_failures,
                        threshold = self.config.max_failures,
                        "Circuit breaker tripped due to consecutive failures"
                    );
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                data.state = CircuitState::Open;
                data.opened_at = Some(Instant::now());
                tracing::warn!("Circuit breaker probe failed, reopening circuit");
                true
            }
            CircuitState::Open => false,
        }
    }

    /// Current circuit state.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.data.lock().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());

        assert!(breaker.should_allow());
        assert!(!breaker.record_failure());
        assert!(!breaker.record_failure());
        assert!(breaker.record_failure());

        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.should_allow());
    }

    #[tokio::test]
    async fn success_resets_the_failure_count() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());

        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();

        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn never_policy_keeps_an_open_circuit_open() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());
        for _ in 0..3 {
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), CircuitState::Open);

        // A stray success resets the count but cannot close the circuit.
        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.should_allow());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_policy_probes_and_closes_on_success() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            max_failures: 2,
            recovery: RecoveryPolicy::Timeout { secs: 300 },
        });

        breaker.record_failure();
        breaker.record_failure();
        assert!(!breaker.should_allow());

        tokio::time::advance(Duration::from_secs(300)).await;

        assert!(breaker.should_allow());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_policy_reopens_on_probe_failure() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            max_failures: 2,
            recovery: RecoveryPolicy::Timeout { secs: 60 },
        });

        breaker.record_failure();
        breaker.record_failure();
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(breaker.should_allow());

        assert!(breaker.record_failure());
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.should_allow());
    }
}
