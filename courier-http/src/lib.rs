//! HTTP boundary for the courier delivery orchestrator.
//!
//! Thin glue over [`courier_delivery::DeliveryOrchestrator`]: a submit
//! endpoint and a status-log endpoint. All orchestration logic lives in the
//! delivery crate; this crate only marshals requests and responses.
//!
//! # Endpoints
//!
//! - **`POST /api/messages/send`** - Submit a message `{to, subject, body}`
//! - **`GET /api/messages/status-log`** - Every status record ever created,
//!   in submission order

mod config;
mod error;
mod server;

pub use config::HttpConfig;
pub use error::HttpError;
pub use server::HttpServer;
