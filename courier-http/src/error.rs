//! HTTP server error types.

use thiserror::Error;

/// Errors that can occur while running the HTTP server.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Failed to bind to the specified address.
    #[error("Failed to bind HTTP server to {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    /// The server encountered a runtime error.
    #[error("HTTP server error: {0}")]
    Server(String),
}
