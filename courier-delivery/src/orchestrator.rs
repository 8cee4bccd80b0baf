//! The delivery orchestrator and its single worker task.
//!
//! Submissions are validated synchronously (idempotency, rate limit,
//! circuit breaker) and then handed over a channel to one dedicated worker
//! task, which processes them strictly in submission order. The channel is
//! the FIFO queue; the worker's exclusivity is the at-most-one-drain
//! invariant. Each submission carries a oneshot sender so the caller only
//! observes its outcome once the delivery attempt has actually completed.

use std::sync::Arc;

use courier_common::{
    audit::{self, AuditLog, RecordId},
    message::Message,
    status::{DeliveryStatus, StatusRecord},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{
    circuit_breaker::{CircuitBreaker, CircuitBreakerConfig},
    error::DeliveryError,
    idempotency::IdempotencyGuard,
    provider::Provider,
    rate_limiter::{RateLimitConfig, RateLimiter},
    retry::{self, RetryPolicy},
};

/// Configuration for the orchestration engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
}

/// One enqueued delivery request.
struct Job {
    message: Message,
    record: RecordId,
    ack: oneshot::Sender<Result<(), DeliveryError>>,
}

/// Ordered pool of providers with a round-robin failover index.
///
/// The index only advances when a provider exhausts its retries for a
/// message; the failed message itself is not re-attempted on the new
/// provider, only subsequent messages move over.
struct ProviderPool {
    providers: Vec<Arc<dyn Provider>>,
    current: usize,
}

impl ProviderPool {
    fn current(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.providers[self.current])
    }

    fn advance(&mut self) {
        self.current = (self.current + 1) % self.providers.len();
        tracing::info!(
            provider = %self.providers[self.current].label(),
            "Failing over to next provider for subsequent messages"
        );
    }
}

/// Composes the idempotency guard, rate limiter, circuit breaker, retry
/// executor and provider pool behind a `submit`/`status_log` contract.
///
/// All state lives in process memory for the lifetime of the orchestrator;
/// nothing survives a restart.
pub struct DeliveryOrchestrator {
    guard: Arc<IdempotencyGuard>,
    limiter: Arc<RateLimiter>,
    breaker: Arc<CircuitBreaker>,
    audit: Arc<AuditLog>,
    jobs: mpsc::UnboundedSender<Job>,
}

impl DeliveryOrchestrator {
    /// Create the orchestrator and spawn its worker task.
    ///
    /// The worker runs until the orchestrator (and with it the sending half
    /// of the job channel) is dropped.
    ///
    /// # Errors
    ///
    /// Fails with [`DeliveryError::Configuration`] if the provider pool is
    /// empty.
    pub fn new(
        config: DeliveryConfig,
        providers: Vec<Arc<dyn Provider>>,
    ) -> Result<Self, DeliveryError> {
        if providers.is_empty() {
            return Err(DeliveryError::Configuration(
                "provider pool must not be empty".to_string(),
            ));
        }

        let guard = Arc::new(IdempotencyGuard::new());
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let breaker = Arc::new(CircuitBreaker::new(config.circuit_breaker));
        let audit = Arc::new(AuditLog::new());

        let (jobs, rx) = mpsc::unbounded_channel();
        let worker = Worker {
            pool: ProviderPool {
                providers,
                current: 0,
            },
            retry: config.retry,
            guard: Arc::clone(&guard),
            limiter: Arc::clone(&limiter),
            breaker: Arc::clone(&breaker),
            audit: Arc::clone(&audit),
        };
        tokio::spawn(worker.run(rx));

        Ok(Self {
            guard,
            limiter,
            breaker,
            audit,
            jobs,
        })
    }

    /// Submit a message for delivery and wait for its outcome.
    ///
    /// Exactly one [`StatusRecord`] is appended to the audit log per call,
    /// before any rejection can occur. Duplicates short-circuit with a
    /// `duplicate` record; rate-limit and circuit-open rejections leave the
    /// record `pending` (faithful to the legacy behavior, see DESIGN.md).
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::Duplicate`] when the message was already delivered
    /// - [`DeliveryError::RateLimitExceeded`] when the window budget is spent
    /// - [`DeliveryError::CircuitOpen`] when the breaker is open
    /// - [`DeliveryError::MaxRetriesExceeded`] when every retry failed
    pub async fn submit(&self, message: Message) -> Result<(), DeliveryError> {
        let key = message.idempotency_key();

        if self.guard.is_duplicate(&key) {
            tracing::info!(idempotency_key = %key, "Rejecting duplicate submission");
            let mut record = StatusRecord::new(key, message);
            record.resolve(DeliveryStatus::Duplicate, None);
            self.audit.append(record);
            return Err(DeliveryError::Duplicate);
        }

        let record = self
            .audit
            .append(StatusRecord::new(key.clone(), message.clone()));

        self.limiter.check()?;

        if !self.breaker.should_allow() {
            tracing::warn!(idempotency_key = %key, "Rejecting submission, circuit breaker is open");
            return Err(DeliveryError::CircuitOpen);
        }

        let (ack, outcome) = oneshot::channel();
        self.jobs
            .send(Job {
                message,
                record,
                ack,
            })
            .map_err(|_| DeliveryError::Shutdown)?;

        outcome.await.map_err(|_| DeliveryError::Shutdown)?
    }

    /// Read-only copies of every status record ever created, in submission
    /// order.
    #[must_use]
    pub fn status_log(&self) -> Vec<StatusRecord> {
        self.audit.snapshot()
    }
}

/// The single delivery worker.
struct Worker {
    pool: ProviderPool,
    retry: RetryPolicy,
    guard: Arc<IdempotencyGuard>,
    limiter: Arc<RateLimiter>,
    breaker: Arc<CircuitBreaker>,
    audit: Arc<AuditLog>,
}

impl Worker {
    async fn run(mut self, mut jobs: mpsc::UnboundedReceiver<Job>) {
        while let Some(Job {
            message,
            record,
            ack,
        }) = jobs.recv().await
        {
            let outcome = self.process(&message, record).await;
            // The submitter may have gone away; its record is already
            // resolved either way.
            let _ = ack.send(outcome);
        }

        tracing::debug!("Delivery worker stopping, job channel closed");
    }

    async fn process(&mut self, message: &Message, record: RecordId) -> Result<(), DeliveryError> {
        let provider = self.pool.current();
        let key = message.idempotency_key();

        match retry::deliver_with_retries(&self.retry, provider.as_ref(), message, record, &self.audit)
            .await
        {
            Ok(()) => {
                self.guard.mark_delivered(key.clone());
                self.audit.resolve(record, DeliveryStatus::Sent, None);
                self.limiter.record_completion();
                self.breaker.record_success();

                let attempts = self.audit.get(record).map_or(0, |r| r.attempts);
                audit::log_delivery_success(key.as_str(), provider.label(), attempts);
                Ok(())
            }
            Err(error) => {
                self.audit
                    .resolve(record, DeliveryStatus::Failed, Some(error.to_string()));
                self.breaker.record_failure();
                self.pool.advance();

                let attempts = self.audit.get(record).map_or(0, |r| r.attempts);
                audit::log_delivery_failure(
                    key.as_str(),
                    provider.label(),
                    attempts,
                    &error.to_string(),
                );
                Err(error)
            }
        }
    }
}
