//! Driving port for session reads and live subscriptions.

use std::fmt;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::domain::{Error, Session, SessionId};

/// One observed state of a session document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSnapshot {
    /// The session exists with this state.
    Present(Session),
    /// No session document exists at the subscribed id.
    Absent,
}

/// Live, ordered feed of [`SessionSnapshot`]s for one session.
///
/// The first item reflects the state at subscription time; each later item
/// follows a change. Items that cannot be decoded are yielded as errors and
/// the feed continues. Consuming the subscription with
/// [`SessionSubscription::unsubscribe`] (or dropping it) stops delivery.
pub struct SessionSubscription {
    session_id: SessionId,
    snapshots: BoxStream<'static, Result<SessionSnapshot, Error>>,
}

impl SessionSubscription {
    pub fn new(
        session_id: SessionId,
        snapshots: BoxStream<'static, Result<SessionSnapshot, Error>>,
    ) -> Self {
        Self {
            session_id,
            snapshots,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Await the next snapshot; `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<Result<SessionSnapshot, Error>> {
        self.snapshots.next().await
    }

    /// Stop receiving snapshots and release the underlying watch.
    pub fn unsubscribe(self) {
        debug!(session_id = %self.session_id, "session subscription closed");
    }
}

impl fmt::Debug for SessionSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSubscription")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

/// Driving port for session read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionQuery: Send + Sync {
    /// Read the current state of a session.
    async fn get_session(&self, session_id: SessionId) -> Result<Session, Error>;

    /// Subscribe to every state change of a session.
    async fn subscribe(&self, session_id: SessionId) -> Result<SessionSubscription, Error>;
}

/// Fixture query implementation in which no session exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionQuery;

#[async_trait]
impl SessionQuery for FixtureSessionQuery {
    async fn get_session(&self, session_id: SessionId) -> Result<Session, Error> {
        Err(Error::not_found(format!("session {session_id} not found")))
    }

    async fn subscribe(&self, session_id: SessionId) -> Result<SessionSubscription, Error> {
        Ok(SessionSubscription::new(
            session_id,
            stream::iter(vec![Ok(SessionSnapshot::Absent)]).boxed(),
        ))
    }
}
