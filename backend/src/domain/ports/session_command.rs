//! Driving port for session mutations.
//!
//! Inbound adapters create and join sessions, add players, overwrite chip
//! counts, and record buy-ins through this port.

use async_trait::async_trait;
use chrono::Utc;
use rand::thread_rng;

use crate::domain::{
    BuyIn, BuyInId, Error, Player, PlayerId, PlayerName, SessionCode, SessionId, SessionPassword,
};

/// Request to create a session.
///
/// A missing `code` asks the service to generate one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateSessionRequest {
    pub code: Option<String>,
    pub password: Option<SessionPassword>,
}

/// Identifier and join code of a newly created session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub code: SessionCode,
}

/// Request to join a session by code.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSessionRequest {
    pub code: String,
    pub password: Option<SessionPassword>,
}

/// Session resolved by a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSessionResponse {
    pub session_id: SessionId,
}

/// Request to add a player to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPlayerRequest {
    pub session_id: SessionId,
    pub name: String,
}

/// Request to overwrite a player's chip count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePlayerChipsRequest {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub chips: i64,
}

/// Request to record a buy-in for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddBuyInRequest {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub amount: i64,
}

/// Driving port for session write operations.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), chiptally::domain::Error> {
/// use chiptally::domain::ports::{CreateSessionRequest, FixtureSessionCommand, SessionCommand};
///
/// let created = FixtureSessionCommand
///     .create_session(CreateSessionRequest::default())
///     .await?;
/// assert_eq!(created.code.as_ref().len(), 6);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCommand: Send + Sync {
    /// Create a session, claiming the requested or a generated code.
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, Error>;

    /// Resolve a code to a session, checking password and activity.
    async fn join_session(&self, request: JoinSessionRequest)
    -> Result<JoinSessionResponse, Error>;

    /// Add a player with no chips and no buy-ins.
    async fn add_player(&self, request: AddPlayerRequest) -> Result<Player, Error>;

    /// Overwrite a player's chip count; the last writer wins.
    async fn update_player_chips(&self, request: UpdatePlayerChipsRequest) -> Result<(), Error>;

    /// Record a buy-in, crediting the amount to both chips and total buy-in.
    async fn add_buy_in(&self, request: AddBuyInRequest) -> Result<BuyIn, Error>;
}

/// Fixture command implementation for tests that do not need a store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionCommand;

#[async_trait]
impl SessionCommand for FixtureSessionCommand {
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, Error> {
        let code = match request.code {
            Some(raw) => SessionCode::new(raw)
                .map_err(|err| Error::invalid_request(format!("invalid session code: {err}")))?,
            None => SessionCode::generate(&mut thread_rng()),
        };
        Ok(CreateSessionResponse {
            session_id: SessionId::random(),
            code,
        })
    }

    async fn join_session(
        &self,
        request: JoinSessionRequest,
    ) -> Result<JoinSessionResponse, Error> {
        Err(Error::not_found(format!(
            "session {} not found",
            request.code.trim()
        )))
    }

    async fn add_player(&self, request: AddPlayerRequest) -> Result<Player, Error> {
        let name = PlayerName::new(&request.name)
            .map_err(|err| Error::invalid_request(format!("invalid player name: {err}")))?;
        Ok(Player::new(PlayerId::random(), name, Utc::now()))
    }

    async fn update_player_chips(&self, _request: UpdatePlayerChipsRequest) -> Result<(), Error> {
        Ok(())
    }

    async fn add_buy_in(&self, request: AddBuyInRequest) -> Result<BuyIn, Error> {
        Ok(BuyIn::new(BuyInId::random(), request.amount, Utc::now()))
    }
}
