//! Stored JSON layout of session and code-index documents.
//!
//! ```text
//! sessions/<sessionId>  = { id, code, password?, isActive, createdAt, updatedAt,
//!                           players: { <playerId>: Player } }
//! session_codes/<CODE>  = { sessionId }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BuyIn, BuyInId, Player, PlayerId, PlayerName, Session, SessionCode, SessionDraft, SessionId,
    SessionPassword, SessionValidationError,
};
use crate::domain::ports::{DocumentKey, FieldPath};

pub(crate) const SESSIONS_COLLECTION: &str = "sessions";
pub(crate) const SESSION_CODES_COLLECTION: &str = "session_codes";

const PLAYERS: &str = "players";

pub(crate) fn session_key(id: SessionId) -> DocumentKey {
    DocumentKey::new(SESSIONS_COLLECTION, id.to_string())
}

pub(crate) fn code_key(code: &SessionCode) -> DocumentKey {
    DocumentKey::new(SESSION_CODES_COLLECTION, code.as_ref())
}

pub(crate) fn created_at_path() -> FieldPath {
    FieldPath::root("createdAt")
}

pub(crate) fn updated_at_path() -> FieldPath {
    FieldPath::root("updatedAt")
}

pub(crate) fn player_path(id: PlayerId) -> FieldPath {
    FieldPath::root(PLAYERS).child(id.to_string())
}

pub(crate) fn chips_path(id: PlayerId) -> FieldPath {
    player_path(id).child("chips")
}

pub(crate) fn buy_ins_path(id: PlayerId) -> FieldPath {
    player_path(id).child("buyIns")
}

pub(crate) fn total_buy_in_path(id: PlayerId) -> FieldPath {
    player_path(id).child("totalBuyIn")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodeIndexDocument {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BuyInDocument {
    pub id: BuyInId,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerDocument {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub chips: i64,
    #[serde(default)]
    pub buy_ins: Vec<BuyInDocument>,
    #[serde(default)]
    pub total_buy_in: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionDocument {
    pub id: SessionId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub players: BTreeMap<String, PlayerDocument>,
}

impl From<&BuyIn> for BuyInDocument {
    fn from(value: &BuyIn) -> Self {
        Self {
            id: value.id,
            amount: value.amount,
            timestamp: value.timestamp,
        }
    }
}

impl From<BuyInDocument> for BuyIn {
    fn from(value: BuyInDocument) -> Self {
        BuyIn::new(value.id, value.amount, value.timestamp)
    }
}

impl From<&Player> for PlayerDocument {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id,
            name: value.name.to_string(),
            chips: value.chips,
            buy_ins: value.buy_ins.iter().map(BuyInDocument::from).collect(),
            total_buy_in: value.total_buy_in,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<PlayerDocument> for Player {
    type Error = SessionValidationError;

    fn try_from(value: PlayerDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            name: PlayerName::new(value.name)?,
            chips: value.chips,
            buy_ins: value.buy_ins.into_iter().map(BuyIn::from).collect(),
            total_buy_in: value.total_buy_in,
            created_at: value.created_at,
        })
    }
}

impl From<&Session> for SessionDocument {
    fn from(value: &Session) -> Self {
        Self {
            id: value.id(),
            code: value.code().to_string(),
            password: value.password().map(|p| p.expose().to_owned()),
            is_active: value.is_active(),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
            players: value
                .players()
                .map(|player| (player.id().to_string(), PlayerDocument::from(player)))
                .collect(),
        }
    }
}

impl TryFrom<SessionDocument> for Session {
    type Error = SessionValidationError;

    fn try_from(value: SessionDocument) -> Result<Self, Self::Error> {
        let players = value
            .players
            .into_iter()
            .map(|(key, document)| {
                if key != document.id.to_string() {
                    return Err(SessionValidationError::PlayerKeyMismatch {
                        key,
                        player_id: document.id,
                    });
                }
                Player::try_from(document)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Session::new(SessionDraft {
            id: value.id,
            code: SessionCode::new(value.code)?,
            password: SessionPassword::from_input(value.password),
            players,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }))
    }
}
