//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureSessionCommand, FixtureSessionQuery, SessionCommand, SessionQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub sessions: Arc<dyn SessionCommand>,
    pub sessions_query: Arc<dyn SessionQuery>,
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(Arc::new(FixtureSessionCommand), Arc::new(FixtureSessionQuery))
    }
}

impl HttpState {
    /// Construct state from the session command and query ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use chiptally::domain::ports::{FixtureSessionCommand, FixtureSessionQuery};
    /// use chiptally::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureSessionCommand),
    ///     Arc::new(FixtureSessionQuery),
    /// );
    /// let _sessions = state.sessions.clone();
    /// ```
    pub fn new(sessions: Arc<dyn SessionCommand>, sessions_query: Arc<dyn SessionQuery>) -> Self {
        Self {
            sessions,
            sessions_query,
        }
    }
}
