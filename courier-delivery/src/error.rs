//! Typed error handling for the orchestration engine.
//!
//! The taxonomy distinguishes outcomes the caller must react to:
//! - `Duplicate` — expected, short-circuits processing
//! - `RateLimitExceeded` / `CircuitOpen` — submission rejected outright
//! - `MaxRetriesExceeded` — retries exhausted against one provider
//!
//! Transient [`ProviderError`]s never escape the retry executor; only
//! exhaustion, rate-limit, and circuit-open conditions propagate to the
//! caller.

use thiserror::Error;

/// Top-level error type surfaced by [`DeliveryOrchestrator::submit`].
///
/// [`DeliveryOrchestrator::submit`]: crate::DeliveryOrchestrator::submit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The message was already successfully delivered.
    #[error("Message is a duplicate")]
    Duplicate,

    /// The completed-send budget for the current window is exhausted.
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimitExceeded,

    /// The circuit breaker is open due to sustained provider failure.
    #[error("Circuit breaker is open. Please try again later.")]
    CircuitOpen,

    /// All retry attempts against the acting provider were exhausted.
    #[error("Max retry attempts reached for {provider}")]
    MaxRetriesExceeded { provider: String },

    /// The delivery worker is no longer running.
    #[error("Delivery worker unavailable, shutting down")]
    Shutdown,

    /// Invalid orchestrator configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DeliveryError {
    /// Returns `true` for the expected duplicate short-circuit.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate)
    }

    /// Returns `true` if the submission was rejected before enqueueing.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::CircuitOpen)
    }

    /// Returns `true` if delivery was attempted and exhausted its retries.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::MaxRetriesExceeded { .. })
    }
}

/// A transient failure reported by a provider for a single attempt.
///
/// Recovered locally via retry and backoff; surfaced only after retries are
/// exhausted, and then only as [`DeliveryError::MaxRetriesExceeded`].
#[derive(Debug, Clone, Error)]
#[error("{provider} failed to send message: {reason}")]
pub struct ProviderError {
    pub provider: String,
    pub reason: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_helpers() {
        assert!(DeliveryError::Duplicate.is_duplicate());
        assert!(DeliveryError::RateLimitExceeded.is_rejection());
        assert!(DeliveryError::CircuitOpen.is_rejection());
        assert!(
            DeliveryError::MaxRetriesExceeded {
                provider: "mock-alpha".to_string()
            }
            .is_exhausted()
        );
        assert!(!DeliveryError::Duplicate.is_rejection());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            DeliveryError::RateLimitExceeded.to_string(),
            "Rate limit exceeded. Please try again later."
        );
        assert_eq!(
            ProviderError::new("mock-alpha", "simulated failure").to_string(),
            "mock-alpha failed to send message: simulated failure"
        );
    }
}
