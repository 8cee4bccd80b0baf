//! Lifecycle status tracking for delivery requests.

use core::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{IdempotencyKey, Message};

/// The lifecycle state of a single delivery request.
///
/// `Pending` is the only non-terminal state. A record that is rejected at
/// submission time (rate limit, open circuit) deliberately stays `Pending`
/// in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed,
    Duplicate,
}

impl DeliveryStatus {
    /// Returns `true` if this status will never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Duplicate => "duplicate",
        };
        write!(fmt, "{name}")
    }
}

/// The audit record for one delivery request.
///
/// Exactly one record is created per submission and appended to the audit
/// log immediately; it is then mutated in place as processing proceeds, and
/// never deleted. Callers only ever see read-only copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub idempotency_key: IdempotencyKey,
    pub message: Message,
    pub status: DeliveryStatus,
    /// Label of the provider that last acted on this message.
    pub provider: Option<String>,
    /// Terminal error description, if the request failed.
    pub error: Option<String>,
    /// Number of provider attempts made for this message.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

impl StatusRecord {
    /// Create a fresh `Pending` record for a submission.
    #[must_use]
    pub fn new(idempotency_key: IdempotencyKey, message: Message) -> Self {
        Self {
            idempotency_key,
            message,
            status: DeliveryStatus::Pending,
            provider: None,
            error: None,
            attempts: 0,
            created_at: Utc::now(),
        }
    }

    /// Record the provider currently acting on this message.
    pub fn set_provider(&mut self, label: &str) {
        self.provider = Some(label.to_string());
    }

    /// Count one provider attempt.
    pub const fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Move the record to a terminal status.
    pub fn resolve(&mut self, status: DeliveryStatus, error: Option<String>) {
        self.status = status;
        self.error = error;
    }
}
