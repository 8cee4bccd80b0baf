//! Append-only audit log for message lifecycle records.
//!
//! Every submission appends exactly one [`StatusRecord`] to the log, which
//! is then mutated in place through its [`RecordId`] as processing proceeds.
//! Entries are never removed for the life of the process, and the insertion
//! order is the submission order.
//!
//! The module also provides structured lifecycle events in the
//! `tracing` stream (attempt, success, failure) for operational monitoring.

use parking_lot::RwLock;

use crate::status::{DeliveryStatus, StatusRecord};

/// Handle to a record in the audit log.
///
/// Ids are stable for the life of the process since entries are never
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(usize);

/// Ordered, append-only log of every [`StatusRecord`] ever created.
#[derive(Debug, Default)]
pub struct AuditLog {
    records: RwLock<Vec<StatusRecord>>,
}

impl AuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning its id for later in-place updates.
    pub fn append(&self, record: StatusRecord) -> RecordId {
        let mut records = self.records.write();
        records.push(record);
        RecordId(records.len() - 1)
    }

    /// Record the provider currently acting on a message.
    pub fn set_provider(&self, id: RecordId, label: &str) {
        if let Some(record) = self.records.write().get_mut(id.0) {
            record.set_provider(label);
        }
    }

    /// Count one provider attempt against a record.
    pub fn record_attempt(&self, id: RecordId) {
        if let Some(record) = self.records.write().get_mut(id.0) {
            record.record_attempt();
        }
    }

    /// Move a record to a terminal status.
    pub fn resolve(&self, id: RecordId, status: DeliveryStatus, error: Option<String>) {
        if let Some(record) = self.records.write().get_mut(id.0) {
            record.resolve(status, error);
        }
    }

    /// Read a copy of a single record.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<StatusRecord> {
        self.records.read().get(id.0).cloned()
    }

    /// Read-only copies of every record, in submission order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<StatusRecord> {
        self.records.read().clone()
    }

    /// Number of records ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// Log a delivery attempt event.
pub fn log_delivery_attempt(key: &str, provider: &str, attempt: u32) {
    tracing::event!(
        tracing::Level::DEBUG,
        event = "DeliveryAttempt",
        idempotency_key = %key,
        provider = %provider,
        delivery_attempt = attempt,
        "Audit: Delivery attempt"
    );
}

/// Log a delivery success event.
pub fn log_delivery_success(key: &str, provider: &str, attempts: u32) {
    tracing::event!(
        tracing::Level::INFO,
        event = "DeliverySuccess",
        idempotency_key = %key,
        provider = %provider,
        attempts = attempts,
        "Audit: Delivery successful"
    );
}

/// Log a terminal delivery failure event.
pub fn log_delivery_failure(key: &str, provider: &str, attempts: u32, error: &str) {
    tracing::event!(
        tracing::Level::WARN,
        event = "DeliveryFailure",
        idempotency_key = %key,
        provider = %provider,
        attempts = attempts,
        error = %error,
        "Audit: Delivery failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn record(to: &str) -> StatusRecord {
        let message = Message {
            to: to.to_string(),
            subject: "Hello".to_string(),
            body: "World".to_string(),
        };
        StatusRecord::new(message.idempotency_key(), message)
    }

    #[test]
    fn append_preserves_insertion_order() {
        let log = AuditLog::new();
        log.append(record("a@example.com"));
        log.append(record("b@example.com"));
        log.append(record("c@example.com"));

        let snapshot = log.snapshot();
        let recipients: Vec<_> = snapshot.iter().map(|r| r.message.to.as_str()).collect();
        assert_eq!(recipients, ["a@example.com", "b@example.com", "c@example.com"]);
    }

    #[test]
    fn updates_mutate_the_appended_record_in_place() {
        let log = AuditLog::new();
        let first = log.append(record("a@example.com"));
        let second = log.append(record("b@example.com"));

        log.set_provider(first, "mock-alpha");
        log.record_attempt(first);
        log.resolve(first, DeliveryStatus::Sent, None);
        log.resolve(second, DeliveryStatus::Failed, Some("boom".to_string()));

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].status, DeliveryStatus::Sent);
        assert_eq!(snapshot[0].provider.as_deref(), Some("mock-alpha"));
        assert_eq!(snapshot[0].attempts, 1);
        assert_eq!(snapshot[1].status, DeliveryStatus::Failed);
        assert_eq!(snapshot[1].error.as_deref(), Some("boom"));
    }

    #[test]
    fn snapshot_is_idempotent_without_new_appends() {
        let log = AuditLog::new();
        log.append(record("a@example.com"));
        log.append(record("b@example.com"));

        assert_eq!(log.snapshot(), log.snapshot());
        assert_eq!(log.len(), 2);
    }
}
