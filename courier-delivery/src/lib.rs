//! The courier orchestration engine.
//!
//! This crate composes the delivery pipeline: a submission is checked for
//! idempotency, rate limited, gated by a circuit breaker, then handed to a
//! single worker task that drives bounded retries with exponential backoff
//! against the current provider and fails over to the next provider when
//! retries are exhausted. Every transition is recorded in the append-only
//! audit log.

mod circuit_breaker;
mod error;
mod idempotency;
mod orchestrator;
mod provider;
pub mod providers;
mod rate_limiter;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RecoveryPolicy};
// Re-export common types
pub use courier_common::{
    message::{IdempotencyKey, Message},
    status::{DeliveryStatus, StatusRecord},
};
pub use error::{DeliveryError, ProviderError};
pub use idempotency::IdempotencyGuard;
pub use orchestrator::{DeliveryConfig, DeliveryOrchestrator};
pub use provider::Provider;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use retry::RetryPolicy;
