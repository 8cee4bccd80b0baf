//! Duplicate-submission detection.

use std::collections::HashSet;

use courier_common::message::IdempotencyKey;
use parking_lot::RwLock;

/// Tracks the idempotency keys of successfully delivered messages.
///
/// A key is marked only after a provider attempt actually succeeds, never on
/// provisional queueing, so a message that is still in flight (or that
/// failed) can be resubmitted. The set grows monotonically for the life of
/// the process.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    delivered: RwLock<HashSet<IdempotencyKey>>,
}

impl IdempotencyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a message with this key was already delivered.
    #[must_use]
    pub fn is_duplicate(&self, key: &IdempotencyKey) -> bool {
        self.delivered.read().contains(key)
    }

    /// Mark a key as successfully delivered.
    pub fn mark_delivered(&self, key: IdempotencyKey) {
        self.delivered.write().insert(key);
    }

    /// Number of distinct delivered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delivered.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delivered.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use courier_common::message::Message;

    use super::*;

    fn key(to: &str) -> IdempotencyKey {
        Message {
            to: to.to_string(),
            subject: "Hello".to_string(),
            body: "World".to_string(),
        }
        .idempotency_key()
    }

    #[test]
    fn unseen_keys_are_not_duplicates() {
        let guard = IdempotencyGuard::new();
        assert!(!guard.is_duplicate(&key("user@example.com")));
        assert!(guard.is_empty());
    }

    #[test]
    fn marked_keys_are_duplicates() {
        let guard = IdempotencyGuard::new();
        guard.mark_delivered(key("user@example.com"));

        assert!(guard.is_duplicate(&key("user@example.com")));
        assert!(!guard.is_duplicate(&key("other@example.com")));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn marking_twice_is_harmless() {
        let guard = IdempotencyGuard::new();
        guard.mark_delivered(key("user@example.com"));
        guard.mark_delivered(key("user@example.com"));
        assert_eq!(guard.len(), 1);
    }
}
