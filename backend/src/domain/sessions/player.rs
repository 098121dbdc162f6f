//! Players and their buy-in history.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{BuyInId, PlayerId, SessionValidationError};

/// Longest accepted display name, in characters.
pub const PLAYER_NAME_MAX: usize = 32;

/// Trimmed, non-empty player display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, SessionValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SessionValidationError::EmptyPlayerName);
        }
        if trimmed.chars().count() > PLAYER_NAME_MAX {
            return Err(SessionValidationError::PlayerNameTooLong {
                max: PLAYER_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PlayerName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// One recorded purchase of chips. Buy-ins are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyIn {
    pub(super) id: BuyInId,
    pub(super) amount: i64,
    pub(super) timestamp: DateTime<Utc>,
}

impl BuyIn {
    #[must_use]
    pub fn new(id: BuyInId, amount: i64, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            amount,
            timestamp,
        }
    }

    #[must_use]
    pub fn id(&self) -> BuyInId {
        self.id
    }

    #[must_use]
    pub fn amount(&self) -> i64 {
        self.amount
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A participant in a session.
///
/// `total_buy_in` is the running total maintained by the store on every
/// buy-in; [`Player::recorded_buy_in_sum`] recomputes it from the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(super) id: PlayerId,
    pub(super) name: PlayerName,
    pub(super) chips: i64,
    pub(super) buy_ins: Vec<BuyIn>,
    pub(super) total_buy_in: i64,
    pub(super) created_at: DateTime<Utc>,
}

impl Player {
    /// Create a player with no chips and no buy-ins.
    #[must_use]
    pub fn new(id: PlayerId, name: PlayerName, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            chips: 0,
            buy_ins: Vec::new(),
            total_buy_in: 0,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    #[must_use]
    pub fn chips(&self) -> i64 {
        self.chips
    }

    #[must_use]
    pub fn buy_ins(&self) -> &[BuyIn] {
        &self.buy_ins
    }

    #[must_use]
    pub fn total_buy_in(&self) -> i64 {
        self.total_buy_in
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply a buy-in the same way the store does: record it and credit the
    /// amount to both chips and the running total.
    #[must_use]
    pub fn with_buy_in(mut self, buy_in: BuyIn) -> Self {
        self.chips = self.chips.saturating_add(buy_in.amount);
        self.total_buy_in = self.total_buy_in.saturating_add(buy_in.amount);
        self.buy_ins.push(buy_in);
        self
    }

    /// Current chips minus everything bought in. Negative means a loss.
    #[must_use]
    pub fn profit_loss(&self) -> i64 {
        self.chips.saturating_sub(self.total_buy_in)
    }

    /// Sum of the individual buy-in records.
    #[must_use]
    pub fn recorded_buy_in_sum(&self) -> i64 {
        self.buy_ins
            .iter()
            .fold(0_i64, |acc, buy_in| acc.saturating_add(buy_in.amount))
    }
}
