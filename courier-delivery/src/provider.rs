//! The delivery provider capability.

use async_trait::async_trait;
use courier_common::message::Message;

use crate::error::ProviderError;

/// A pluggable delivery backend.
///
/// The orchestrator is agnostic to how a provider actually delivers;
/// implementations are interchangeable and the engine works with any
/// ordered, non-empty list of them. A failed attempt is always treated as
/// transient and retried with backoff until the retry budget is exhausted.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable label recorded on status records and audit events.
    fn label(&self) -> &str;

    /// Attempt to deliver one message.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when this attempt failed; the caller
    /// decides whether to retry.
    async fn attempt_delivery(&self, message: &Message) -> Result<(), ProviderError>;
}
