//! Shared WebSocket adapter state.
//!
//! WebSocket entry points depend on domain ports (use-cases) instead of
//! constructing domain services directly. This makes the adapter testable with
//! deterministic test doubles and keeps side effects out of the connection
//! loop.

use std::sync::Arc;

use crate::domain::ports::SessionQuery;
use crate::inbound::ws::origin::OriginAllowList;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub sessions: Arc<dyn SessionQuery>,
    pub allowed_origins: Arc<OriginAllowList>,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(sessions: Arc<dyn SessionQuery>, allowed_origins: OriginAllowList) -> Self {
        Self {
            sessions,
            allowed_origins: Arc::new(allowed_origins),
        }
    }
}
