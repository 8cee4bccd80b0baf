//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to bind the HTTP server.
    ///
    /// Common values:
    /// - `[::]:3000` (IPv6 any address, port 3000)
    /// - `0.0.0.0:3000` (IPv4 any address, port 3000)
    /// - `127.0.0.1:3000` (localhost only, port 3000)
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

fn default_listen_address() -> String {
    "[::]:3000".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
        }
    }
}
