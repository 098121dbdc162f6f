//! Session domain services.
//!
//! These services implement the session driving ports on top of the
//! [`SessionStore`] driven port. Every mutation is a single store write:
//! code claims use create-if-absent, and player updates are conditional
//! patches so that concurrent writers never lose buy-ins.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use mockable::Clock;
use rand::thread_rng;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::ports::{
    AddBuyInRequest, AddPlayerRequest, CreateSessionRequest, CreateSessionResponse, DocumentPatch,
    JoinSessionRequest, JoinSessionResponse, SessionCommand, SessionQuery, SessionSnapshot,
    SessionStore, SessionStoreError, SessionSubscription, UpdatePlayerChipsRequest, WatchItem,
};
use crate::domain::sessions::document::{
    BuyInDocument, CodeIndexDocument, PlayerDocument, SessionDocument, buy_ins_path, chips_path,
    code_key, created_at_path, player_path, session_key, total_buy_in_path, updated_at_path,
};
use crate::domain::{
    BuyIn, BuyInId, Error, Player, PlayerId, PlayerName, Session, SessionCode, SessionDraft,
    SessionId,
};

/// Attempts made to find a free code when the caller does not supply one.
pub const MAX_CODE_ATTEMPTS: usize = 8;

fn map_store_error(error: SessionStoreError) -> Error {
    match error {
        SessionStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("session store unavailable: {message}"))
        }
        SessionStoreError::NotFound { key } => Error::not_found(format!("{key} not found")),
        SessionStoreError::AlreadyExists { key } => {
            Error::conflict(format!("{key} already exists"))
        }
        other @ (SessionStoreError::PreconditionFailed { .. }
        | SessionStoreError::InvalidPatch { .. }) => {
            Error::internal(format!("session store error: {other}"))
        }
    }
}

fn map_patch_error(error: SessionStoreError, session_id: SessionId, player_id: PlayerId) -> Error {
    match error {
        SessionStoreError::NotFound { .. } => session_not_found(session_id),
        SessionStoreError::PreconditionFailed { .. } => {
            Error::not_found(format!("player {player_id} not found in session {session_id}"))
        }
        other => map_store_error(other),
    }
}

fn session_not_found(session_id: SessionId) -> Error {
    Error::not_found(format!("session {session_id} not found"))
}

fn encode<T: Serialize>(document: &T) -> Result<Value, Error> {
    serde_json::to_value(document)
        .map_err(|err| Error::internal(format!("failed to encode session document: {err}")))
}

fn decode_session(session_id: SessionId, value: Value) -> Result<Session, Error> {
    let document: SessionDocument = serde_json::from_value(value).map_err(|err| {
        Error::internal(format!("session {session_id} is malformed: {err}"))
    })?;
    Session::try_from(document)
        .map_err(|err| Error::internal(format!("session {session_id} is invalid: {err}")))
}

fn decode_snapshot(session_id: SessionId, item: WatchItem) -> Result<SessionSnapshot, Error> {
    match item.map_err(map_store_error)? {
        Some(value) => decode_session(session_id, value).map(SessionSnapshot::Present),
        None => Ok(SessionSnapshot::Absent),
    }
}

/// Session service implementing the command driving port.
#[derive(Clone)]
pub struct SessionCommandService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SessionCommandService<S> {
    /// Create a new command service over the session store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> SessionCommandService<S>
where
    S: SessionStore,
{
    /// Returns `Ok(false)` when another session already holds the code.
    async fn claim_code(&self, code: &SessionCode, index: &Value) -> Result<bool, Error> {
        match self
            .store
            .create(&code_key(code), index.clone(), Vec::new())
            .await
        {
            Ok(()) => Ok(true),
            Err(SessionStoreError::AlreadyExists { .. }) => Ok(false),
            Err(error) => Err(map_store_error(error)),
        }
    }

    async fn claim_generated_code(&self, index: &Value) -> Result<SessionCode, Error> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = SessionCode::generate(&mut thread_rng());
            if self.claim_code(&code, index).await? {
                return Ok(code);
            }
        }
        Err(Error::conflict(format!(
            "no free session code found after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    async fn patch_player(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        patch: DocumentPatch,
    ) -> Result<(), Error> {
        self.store
            .patch(&session_key(session_id), patch)
            .await
            .map_err(|error| map_patch_error(error, session_id, player_id))
    }
}

#[async_trait]
impl<S> SessionCommand for SessionCommandService<S>
where
    S: SessionStore,
{
    async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<CreateSessionResponse, Error> {
        let session_id = SessionId::random();
        let index = encode(&CodeIndexDocument { session_id })?;
        let code = match request.code {
            Some(raw) => {
                let code = SessionCode::new(raw).map_err(|err| {
                    Error::invalid_request(format!("invalid session code: {err}"))
                })?;
                if !self.claim_code(&code, &index).await? {
                    return Err(Error::conflict(format!("session code {code} is taken")));
                }
                code
            }
            None => self.claim_generated_code(&index).await?,
        };

        let now = self.clock.utc();
        let session = Session::new(SessionDraft {
            id: session_id,
            code: code.clone(),
            password: request.password,
            players: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        let written = match encode(&SessionDocument::from(&session)) {
            Ok(document) => self
                .store
                .create(
                    &session_key(session_id),
                    document,
                    vec![created_at_path(), updated_at_path()],
                )
                .await
                .map_err(map_store_error),
            Err(error) => Err(error),
        };
        if let Err(error) = written {
            if let Err(release) = self.store.delete(&code_key(&code)).await {
                warn!(%code, error = %release, "failed to release session code");
            }
            return Err(error);
        }

        info!(%session_id, %code, "session created");
        Ok(CreateSessionResponse { session_id, code })
    }

    async fn join_session(
        &self,
        request: JoinSessionRequest,
    ) -> Result<JoinSessionResponse, Error> {
        let code = SessionCode::new(&request.code)
            .map_err(|err| Error::invalid_request(format!("invalid session code: {err}")))?;
        let not_found = || Error::not_found(format!("no session with code {code}"));

        let index = self
            .store
            .get(&code_key(&code))
            .await
            .map_err(map_store_error)?
            .ok_or_else(not_found)?;
        let CodeIndexDocument { session_id } = serde_json::from_value(index).map_err(|err| {
            Error::internal(format!("code index for {code} is malformed: {err}"))
        })?;
        let value = self
            .store
            .get(&session_key(session_id))
            .await
            .map_err(map_store_error)?
            .ok_or_else(not_found)?;
        let session = decode_session(session_id, value)?;

        if !session.accepts_password(request.password.as_ref()) {
            return Err(Error::unauthorized("incorrect session password"));
        }
        if !session.is_active() {
            return Err(Error::inactive(format!("session {code} is no longer active")));
        }

        info!(%session_id, %code, "session joined");
        Ok(JoinSessionResponse { session_id })
    }

    async fn add_player(&self, request: AddPlayerRequest) -> Result<Player, Error> {
        let name = PlayerName::new(&request.name)
            .map_err(|err| Error::invalid_request(format!("invalid player name: {err}")))?;
        let player = Player::new(PlayerId::random(), name, self.clock.utc());
        let patch = DocumentPatch::new()
            .set(player_path(player.id()), encode(&PlayerDocument::from(&player))?)
            .server_timestamp(updated_at_path());

        self.store
            .patch(&session_key(request.session_id), patch)
            .await
            .map_err(|error| match error {
                SessionStoreError::NotFound { .. } => session_not_found(request.session_id),
                other => map_store_error(other),
            })?;

        info!(session_id = %request.session_id, player_id = %player.id(), "player added");
        Ok(player)
    }

    async fn update_player_chips(&self, request: UpdatePlayerChipsRequest) -> Result<(), Error> {
        let UpdatePlayerChipsRequest {
            session_id,
            player_id,
            chips,
        } = request;
        let patch = DocumentPatch::new()
            .require(player_path(player_id))
            .set(chips_path(player_id), Value::from(chips))
            .server_timestamp(updated_at_path());
        self.patch_player(session_id, player_id, patch).await
    }

    async fn add_buy_in(&self, request: AddBuyInRequest) -> Result<BuyIn, Error> {
        let AddBuyInRequest {
            session_id,
            player_id,
            amount,
        } = request;
        let buy_in = BuyIn::new(BuyInId::random(), amount, self.clock.utc());
        let patch = DocumentPatch::new()
            .require(player_path(player_id))
            .append(buy_ins_path(player_id), encode(&BuyInDocument::from(&buy_in))?)
            .increment(total_buy_in_path(player_id), amount)
            .increment(chips_path(player_id), amount)
            .server_timestamp(updated_at_path());
        self.patch_player(session_id, player_id, patch).await?;

        info!(%session_id, %player_id, amount, "buy-in recorded");
        Ok(buy_in)
    }
}

/// Session service implementing the query driving port.
#[derive(Clone)]
pub struct SessionQueryService<S> {
    store: Arc<S>,
}

impl<S> SessionQueryService<S> {
    /// Create a new query service over the session store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> SessionQuery for SessionQueryService<S>
where
    S: SessionStore,
{
    async fn get_session(&self, session_id: SessionId) -> Result<Session, Error> {
        let value = self
            .store
            .get(&session_key(session_id))
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| session_not_found(session_id))?;
        decode_session(session_id, value)
    }

    async fn subscribe(&self, session_id: SessionId) -> Result<SessionSubscription, Error> {
        let watch = self
            .store
            .watch(&session_key(session_id))
            .await
            .map_err(map_store_error)?;
        let snapshots = stream::unfold(watch, move |mut watch| async move {
            let item = watch.next().await?;
            let snapshot = decode_snapshot(session_id, item);
            if let Err(error) = &snapshot {
                warn!(%session_id, %error, "undecodable session snapshot");
            }
            Some((snapshot, watch))
        });
        Ok(SessionSubscription::new(session_id, snapshots.boxed()))
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
