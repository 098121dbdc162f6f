//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CHIPTALLY_*` environment variables, or a
//! configuration file, in that order of precedence.

use std::net::{AddrParseError, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Configuration values controlling the HTTP listener and WebSocket origins.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHIPTALLY")]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// Origins allowed to open WebSocket feeds. The environment takes a
    /// comma-separated list; a single origin needs a trailing comma or JSON
    /// array form. Wildcard subdomains use `https://*.example.com`.
    pub allowed_origins: Option<Vec<String>>,
}

impl ServerSettings {
    /// Parse the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr.trim().parse()
    }

    /// Return the configured origins, falling back to the local dev server.
    pub fn allowed_origins(&self) -> Vec<&str> {
        self.allowed_origins.as_deref().map_or_else(
            || vec![DEFAULT_ALLOWED_ORIGIN],
            |origins| {
                origins
                    .iter()
                    .map(|origin| origin.trim())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            },
        )
    }
}
