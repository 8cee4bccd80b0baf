//! Shared foundation for the courier delivery orchestrator.
//!
//! This crate holds the leaf types every other crate builds on: the
//! [`Message`](message::Message) data model and its idempotency key, the
//! [`StatusRecord`](status::StatusRecord) lifecycle entity, the append-only
//! [`AuditLog`](audit::AuditLog), and the process-wide ambient concerns
//! (logging initialization, shutdown signalling).

pub mod audit;
pub mod logging;
pub mod message;
pub mod status;

pub use tracing;

/// Process-level lifecycle signal, broadcast to every long-running task.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
}
