//! The session aggregate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{Player, PlayerId, SessionCode, SessionId, SessionPassword};

/// Input used to assemble a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub id: SessionId,
    pub code: SessionCode,
    pub password: Option<SessionPassword>,
    pub players: Vec<Player>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A live chip-tracking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    code: SessionCode,
    password: Option<SessionPassword>,
    players: BTreeMap<PlayerId, Player>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Table-wide chip accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLedger {
    pub total_chips: i64,
    pub total_buy_in: i64,
}

impl SessionLedger {
    /// Chips on the table minus money bought in. Zero when the table balances.
    #[must_use]
    pub fn discrepancy(&self) -> i64 {
        self.total_chips.saturating_sub(self.total_buy_in)
    }
}

impl Session {
    #[must_use]
    pub fn new(draft: SessionDraft) -> Self {
        let SessionDraft {
            id,
            code,
            password,
            players,
            is_active,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            code,
            password,
            players: players.into_iter().map(|p| (p.id(), p)).collect(),
            is_active,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    #[must_use]
    pub fn password(&self) -> Option<&SessionPassword> {
        self.password.as_ref()
    }

    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Players ordered by identifier.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Whether a join attempt with `candidate` may proceed.
    #[must_use]
    pub fn accepts_password(&self, candidate: Option<&SessionPassword>) -> bool {
        self.password
            .as_ref()
            .is_none_or(|required| required.matches(candidate))
    }

    #[must_use]
    pub fn ledger(&self) -> SessionLedger {
        self.players.values().fold(
            SessionLedger {
                total_chips: 0,
                total_buy_in: 0,
            },
            |ledger, player| SessionLedger {
                total_chips: ledger.total_chips.saturating_add(player.chips()),
                total_buy_in: ledger.total_buy_in.saturating_add(player.total_buy_in()),
            },
        )
    }
}
