//! The message data model and its idempotency key.

use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A single delivery request: conceptually an email.
///
/// Immutable once submitted; the orchestrator never mutates a message, only
/// the [`StatusRecord`](crate::status::StatusRecord) tracking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    /// Derive the idempotency key for this message.
    #[must_use]
    pub fn idempotency_key(&self) -> IdempotencyKey {
        IdempotencyKey::from(self)
    }
}

/// Deterministic identifier derived from message content, used to detect
/// resubmission of the same logical request.
///
/// The key is the plain `to:subject:body` concatenation, not a hash: two
/// messages with identical fields are indistinguishable by design. Callers
/// that need distinct deliveries of textually-identical messages must vary
/// one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Message> for IdempotencyKey {
    fn from(message: &Message) -> Self {
        Self(format!(
            "{}:{}:{}",
            message.to, message.subject, message.body
        ))
    }
}

impl Display for IdempotencyKey {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str, subject: &str, body: &str) -> Message {
        Message {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn identical_messages_share_a_key() {
        let a = message("user@example.com", "Hello", "World");
        let b = message("user@example.com", "Hello", "World");
        assert_eq!(a.idempotency_key(), b.idempotency_key());
    }

    #[test]
    fn any_varied_field_produces_a_distinct_key() {
        let base = message("user@example.com", "Hello", "World");
        let variants = [
            message("other@example.com", "Hello", "World"),
            message("user@example.com", "Hi", "World"),
            message("user@example.com", "Hello", "Mundo"),
        ];

        for variant in variants {
            assert_ne!(base.idempotency_key(), variant.idempotency_key());
        }
    }

    #[test]
    fn key_is_the_separator_joined_concatenation() {
        let msg = message("user@example.com", "Hello", "World");
        assert_eq!(msg.idempotency_key().as_str(), "user@example.com:Hello:World");
    }
}
