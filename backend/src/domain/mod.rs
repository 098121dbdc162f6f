//! Domain primitives, aggregates, and services.
//!
//! Purpose: define the session model shared by every adapter, together with
//! the ports the domain drives and is driven through. Types here know
//! nothing about HTTP, WebSockets, or the concrete document store.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `Session`, `Player`, `BuyIn` and their validated value types.
//! - `SessionCommandService` / `SessionQueryService`: port implementations.
//! - `TraceId`: request correlation identifier.

pub mod error;
pub mod ports;
mod session_service;
pub mod sessions;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::session_service::{MAX_CODE_ATTEMPTS, SessionCommandService, SessionQueryService};
pub use self::sessions::{
    BuyIn, BuyInId, PLAYER_NAME_MAX, Player, PlayerId, PlayerName, SESSION_CODE_ALPHABET,
    SESSION_CODE_LEN, Session, SessionCode, SessionDraft, SessionId, SessionLedger,
    SessionPassword, SessionValidationError,
};
pub use self::trace_id::TraceId;

/// HTTP header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
