//! Per-connection WebSocket handler.
//!
//! Forwards every item of a [`SessionSubscription`] to the client while
//! keeping framing and heartbeats at the edge. The public WebSocket contract
//! pings every 5s and considers a connection idle after 10s without client
//! traffic. Tests shorten these intervals to speed up feedback.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{debug, warn};

use crate::domain::ports::{SessionSnapshot, SessionSubscription};
use crate::domain::{Error, SessionId};
use crate::inbound::ws::messages::ServerMessage;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    subscription: SessionSubscription,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(subscription).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    SubscriptionEnded,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession {
    subscription: SessionSubscription,
}

impl WsSession {
    fn new(subscription: SessionSubscription) -> Self {
        Self { subscription }
    }

    async fn run(mut self, mut session: Session, mut stream: MessageStream) {
        let session_id = self.subscription.session_id();
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    handle_stream_message(&mut session, &mut last_heartbeat, message).await
                }
                item = self.subscription.next() => {
                    forward_snapshot(&mut session, session_id, item).await
                }
            };

            if let Err(error) = result {
                log_shutdown_reason(session_id, &error);
                close_session_if_needed(session, close_action_for(&error)).await;
                self.subscription.unsubscribe();
                return;
            }
        }
    }
}

async fn handle_heartbeat_tick(
    session: &mut Session,
    last_heartbeat: &Instant,
) -> Result<(), SessionError> {
    if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
        return Err(SessionError::HeartbeatTimeout);
    }

    session.ping(b"").await.map_err(SessionError::Network)
}

async fn handle_stream_message(
    session: &mut Session,
    last_heartbeat: &mut Instant,
    message: Option<Result<Message, ProtocolError>>,
) -> Result<(), SessionError> {
    let Some(message) = message else {
        return Err(SessionError::StreamClosed);
    };

    match message {
        Ok(Message::Ping(payload)) => {
            *last_heartbeat = Instant::now();
            session.pong(&payload).await.map_err(SessionError::Network)
        }
        // The feed is push-only; any client frame counts as liveness.
        Ok(
            Message::Text(_)
            | Message::Pong(_)
            | Message::Binary(_)
            | Message::Continuation(_)
            | Message::Nop,
        ) => {
            *last_heartbeat = Instant::now();
            Ok(())
        }
        Ok(Message::Close(reason)) => Err(SessionError::ClientClosed(reason)),
        Err(error) => Err(SessionError::Protocol(error)),
    }
}

async fn forward_snapshot(
    session: &mut Session,
    session_id: SessionId,
    item: Option<Result<SessionSnapshot, Error>>,
) -> Result<(), SessionError> {
    let message = match item {
        Some(Ok(snapshot)) => ServerMessage::from_snapshot(session_id, &snapshot),
        Some(Err(error)) => ServerMessage::from(&error),
        None => return Err(SessionError::SubscriptionEnded),
    };
    send_json(session, &message)
        .await
        .map_err(SessionError::Network)
}

async fn send_json(session: &mut Session, payload: &ServerMessage) -> Result<(), Closed> {
    match serde_json::to_string(payload) {
        Ok(body) => session.text(body).await,
        Err(error) => {
            warn!(error = %error, "Failed to serialize WebSocket payload");
            Ok(())
        }
    }
}

fn log_shutdown_reason(session_id: SessionId, error: &SessionError) {
    match error {
        SessionError::HeartbeatTimeout => {
            warn!(%session_id, "WebSocket heartbeat timeout; closing connection");
        }
        SessionError::Protocol(error) => {
            warn!(%session_id, error = %error, "WebSocket protocol error");
        }
        SessionError::Network(error) => {
            warn!(%session_id, error = %error, "WebSocket send failed; closing connection");
        }
        SessionError::SubscriptionEnded => {
            warn!(%session_id, "session subscription ended; closing connection");
        }
        SessionError::ClientClosed(_) | SessionError::StreamClosed => {
            debug!(%session_id, "session subscriber disconnected");
        }
    }
}

fn close_action_for(error: &SessionError) -> CloseAction {
    match error {
        SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Normal,
            description: Some("heartbeat timeout".to_owned()),
        })),
        SessionError::SubscriptionEnded => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Away,
            description: Some("subscription ended".to_owned()),
        })),
        SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
            code: CloseCode::Protocol,
            description: Some("protocol error".to_owned()),
        })),
        SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
        SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
    }
}

async fn close_session_if_needed(session: Session, close_action: CloseAction) {
    if let CloseAction::Close(reason) = close_action {
        if let Err(error) = session.close(reason).await {
            warn!(error = %error, "Failed to close WebSocket session");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
