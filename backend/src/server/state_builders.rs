//! Builders wiring the session store into HTTP and WebSocket state.

use std::sync::Arc;

use actix_web::web;

use chiptally::domain::ports::{SessionCommand, SessionQuery};
use chiptally::domain::{SessionCommandService, SessionQueryService};
use chiptally::inbound::http::state::HttpState;
use chiptally::inbound::ws::state::WsState;
use chiptally::outbound::store::InMemorySessionStore;

use super::ServerConfig;

/// Command and query ports sharing one session store.
#[derive(Clone)]
pub(super) struct SessionPorts {
    pub(super) command: Arc<dyn SessionCommand>,
    pub(super) query: Arc<dyn SessionQuery>,
}

/// Build session services over a fresh in-memory store.
pub(super) fn build_session_ports(config: &ServerConfig) -> SessionPorts {
    let store = Arc::new(InMemorySessionStore::new(config.clock.clone()));
    SessionPorts {
        command: Arc::new(SessionCommandService::new(
            store.clone(),
            config.clock.clone(),
        )),
        query: Arc::new(SessionQueryService::new(store)),
    }
}

pub(super) fn build_http_state(ports: &SessionPorts) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(ports.command.clone(), ports.query.clone()))
}

pub(super) fn build_ws_state(ports: &SessionPorts, config: &ServerConfig) -> web::Data<WsState> {
    web::Data::new(WsState::new(
        ports.query.clone(),
        config.allowed_origins.clone(),
    ))
}
