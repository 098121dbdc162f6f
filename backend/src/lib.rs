//! Chiptally backend: poker chip and buy-in tracking sessions.
//!
//! The crate follows a hexagonal layout. [`domain`] holds the session model,
//! ports, and services; [`outbound`] implements the session store; and
//! [`inbound`] exposes HTTP and WebSocket adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
