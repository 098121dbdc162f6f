//! WebSocket inbound adapter pushing live session snapshots to clients.
//!
//! Responsibilities:
//! - validate upgrade requests (origin allow-list)
//! - open the session subscription before upgrading
//! - run the per-connection loop that forwards snapshots and heartbeats

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{error, info, warn};
use url::Url;

use crate::domain::TraceId;
use crate::inbound::http::validation::{FieldName, parse_session_id};

mod origin;
mod session;

pub mod messages;
pub mod state;

pub use origin::{OriginAllowList, OriginAllowListError};

/// Upgrade `GET /ws/sessions/{session_id}` into a live session feed.
///
/// The first pushed message reflects the current state; each later message
/// follows a change. Closing the socket ends the subscription.
#[get("/ws/sessions/{session_id}")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    path: web::Path<String>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(origin_header, &state.allowed_origins)?;

    let session_id = parse_session_id(&path.into_inner(), FieldName::new("sessionId"))?;
    let subscription = state.sessions.subscribe(session_id).await?;

    let (response, ws_session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    info!(%session_id, "session subscriber connected");

    let connection = session::handle_ws_session(subscription, ws_session, messages);
    match TraceId::current() {
        Some(trace_id) => {
            actix_web::rt::spawn(TraceId::scope(trace_id, connection));
        }
        None => {
            actix_web::rt::spawn(connection);
        }
    }
    Ok(response)
}

fn validate_origin(
    origin_header: &HeaderValue,
    allowed_origins: &OriginAllowList,
) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed_origins.allows(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
