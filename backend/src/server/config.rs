//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use chiptally::inbound::ws::OriginAllowList;
use mockable::{Clock, DefaultClock};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) allowed_origins: OriginAllowList,
    pub(crate) clock: Arc<dyn Clock>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from the listener address and the
    /// origins allowed to open WebSocket feeds.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, allowed_origins: OriginAllowList) -> Self {
        Self {
            bind_addr,
            allowed_origins,
            clock: Arc::new(DefaultClock),
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Replace the clock used for player and session timestamps.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(dead_code, reason = "Exercised by server tests with fixture clocks")
    )]
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(
            dead_code,
            reason = "Exercised by server tests; retained for fixture access"
        )
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
