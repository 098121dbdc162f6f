//! Wire-level message definitions for the WebSocket adapter.
//!
//! Session snapshots are transformed into these payloads before being
//! serialized to JSON and pushed to connected clients.

use serde::Serialize;

use crate::domain::ports::SessionSnapshot;
use crate::domain::{Error, ErrorCode, SessionId};
use crate::inbound::http::sessions::SessionView;

/// Outbound payload pushed to subscribers, tagged by `type`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full current state of the session.
    Snapshot { session: SessionView },
    /// The session document does not exist (yet, or any more).
    #[serde(rename_all = "camelCase")]
    SessionMissing { session_id: String },
    /// A snapshot could not be read; the subscription stays open.
    #[serde(rename_all = "camelCase")]
    Error {
        code: ErrorCode,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
}

impl ServerMessage {
    /// Build the message announcing a snapshot of `session_id`.
    pub fn from_snapshot(session_id: SessionId, snapshot: &SessionSnapshot) -> Self {
        match snapshot {
            SessionSnapshot::Present(session) => Self::Snapshot {
                session: SessionView::from(session),
            },
            SessionSnapshot::Absent => Self::SessionMissing {
                session_id: session_id.to_string(),
            },
        }
    }
}

impl From<&Error> for ServerMessage {
    fn from(value: &Error) -> Self {
        let message = if matches!(value.code(), ErrorCode::InternalError) {
            "Internal server error".to_owned()
        } else {
            value.message().to_owned()
        };
        Self::Error {
            code: value.code(),
            message,
            trace_id: value.trace_id().map(str::to_owned),
        }
    }
}
