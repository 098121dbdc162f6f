//! Poker session, player, and buy-in domain types.
//!
//! A session is a shared chip-tracking context addressed by a human-facing
//! join code. Players hold a live chip count plus an append-only buy-in
//! history; profit and loss is derived at read time and never stored.

use std::fmt;

mod code;
pub(crate) mod document;
mod ids;
mod password;
mod player;
mod session;
#[cfg(test)]
mod tests;

pub use code::{SESSION_CODE_ALPHABET, SESSION_CODE_LEN, SessionCode};
pub use ids::{BuyInId, PlayerId, SessionId};
pub use password::SessionPassword;
pub use player::{BuyIn, PLAYER_NAME_MAX, Player, PlayerName};
pub use session::{Session, SessionDraft, SessionLedger};

/// Validation errors raised by session value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    EmptyCode,
    CodeTooLong { max: usize },
    CodeInvalidCharacters,
    EmptyPlayerName,
    PlayerNameTooLong { max: usize },
    InvalidIdentifier { value: String },
    PlayerKeyMismatch { key: String, player_id: PlayerId },
}

impl fmt::Display for SessionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "session code must not be empty"),
            Self::CodeTooLong { max } => {
                write!(f, "session code must be at most {max} characters")
            }
            Self::CodeInvalidCharacters => {
                write!(f, "session code may only contain letters and digits")
            }
            Self::EmptyPlayerName => write!(f, "player name must not be empty"),
            Self::PlayerNameTooLong { max } => {
                write!(f, "player name must be at most {max} characters")
            }
            Self::InvalidIdentifier { value } => {
                write!(f, "identifier must be a valid UUID (got {value})")
            }
            Self::PlayerKeyMismatch { key, player_id } => {
                write!(f, "player stored under {key} carries id {player_id}")
            }
        }
    }
}

impl std::error::Error for SessionValidationError {}
