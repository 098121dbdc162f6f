//! Session HTTP handlers.
//!
//! ```text
//! POST /api/v1/sessions
//! POST /api/v1/sessions/join
//! GET  /api/v1/sessions/{sessionId}
//! POST /api/v1/sessions/{sessionId}/players
//! PUT  /api/v1/sessions/{sessionId}/players/{playerId}/chips
//! POST /api/v1/sessions/{sessionId}/players/{playerId}/buy-ins
//! ```
//!
//! Views never carry the session password; clients only learn whether one
//! is set through `hasPassword`.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    AddBuyInRequest, AddPlayerRequest, CreateSessionRequest, CreateSessionResponse,
    JoinSessionRequest, JoinSessionResponse, UpdatePlayerChipsRequest,
};
use crate::domain::{BuyIn, Player, Session, SessionLedger, SessionPassword};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_player_id, parse_session_id, require_non_negative, require_positive,
};

const SESSION_ID: FieldName = FieldName::new("sessionId");
const PLAYER_ID: FieldName = FieldName::new("playerId");

/// Request payload for creating a session.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequestBody {
    /// Join code to claim; generated when omitted.
    #[schema(example = "FRIDAY")]
    pub code: Option<String>,
    /// Optional password; blank values leave the session open.
    pub password: Option<String>,
}

/// Response payload for session creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponseBody {
    #[schema(format = "uuid")]
    pub session_id: String,
    #[schema(example = "FRIDAY")]
    pub code: String,
}

impl From<CreateSessionResponse> for CreateSessionResponseBody {
    fn from(value: CreateSessionResponse) -> Self {
        Self {
            session_id: value.session_id.to_string(),
            code: value.code.to_string(),
        }
    }
}

/// Request payload for joining a session by code.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequestBody {
    #[schema(example = "friday")]
    pub code: String,
    pub password: Option<String>,
}

/// Response payload for a successful join.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponseBody {
    #[schema(format = "uuid")]
    pub session_id: String,
}

impl From<JoinSessionResponse> for JoinSessionResponseBody {
    fn from(value: JoinSessionResponse) -> Self {
        Self {
            session_id: value.session_id.to_string(),
        }
    }
}

/// Request payload for adding a player.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerRequestBody {
    #[schema(example = "Ada")]
    pub name: String,
}

/// Request payload for overwriting a player's chip count.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChipsRequestBody {
    #[schema(minimum = 0, example = 1500)]
    pub chips: i64,
}

/// Request payload for recording a buy-in.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddBuyInRequestBody {
    #[schema(minimum = 1, example = 1000)]
    pub amount: i64,
}

/// A single recorded buy-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyInView {
    #[schema(format = "uuid")]
    pub id: String,
    pub amount: i64,
    #[schema(format = "date-time")]
    pub timestamp: String,
}

impl From<&BuyIn> for BuyInView {
    fn from(value: &BuyIn) -> Self {
        Self {
            id: value.id().to_string(),
            amount: value.amount(),
            timestamp: value.timestamp().to_rfc3339(),
        }
    }
}

/// A player with their chip count and derived profit or loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub chips: i64,
    pub total_buy_in: i64,
    /// `chips - totalBuyIn`.
    pub profit_loss: i64,
    pub buy_ins: Vec<BuyInView>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<&Player> for PlayerView {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().to_string(),
            chips: value.chips(),
            total_buy_in: value.total_buy_in(),
            profit_loss: value.profit_loss(),
            buy_ins: value.buy_ins().iter().map(BuyInView::from).collect(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Session-wide chip and buy-in totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerView {
    pub total_chips: i64,
    pub total_buy_in: i64,
    /// Non-zero when chips on the table differ from money paid in.
    pub discrepancy: i64,
}

impl From<SessionLedger> for LedgerView {
    fn from(value: SessionLedger) -> Self {
        Self {
            total_chips: value.total_chips,
            total_buy_in: value.total_buy_in,
            discrepancy: value.discrepancy(),
        }
    }
}

/// Client-facing view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[schema(format = "uuid")]
    pub id: String,
    pub code: String,
    pub has_password: bool,
    pub is_active: bool,
    pub players: Vec<PlayerView>,
    pub ledger: LedgerView,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<&Session> for SessionView {
    fn from(value: &Session) -> Self {
        Self {
            id: value.id().to_string(),
            code: value.code().to_string(),
            has_password: value.has_password(),
            is_active: value.is_active(),
            players: value.players().map(PlayerView::from).collect(),
            ledger: LedgerView::from(value.ledger()),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

/// Create a session, claiming the requested join code or generating one.
///
/// # Examples
/// ```no_run
/// use actix_web::{HttpResponse, web};
/// use chiptally::inbound::http::sessions::{CreateSessionRequestBody, create_session};
/// use chiptally::inbound::http::{ApiResult, state::HttpState};
///
/// async fn call_handler(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
///     let payload = web::Json(CreateSessionRequestBody {
///         code: Some("FRIDAY".to_owned()),
///         password: None,
///     });
///     create_session(state, payload).await
/// }
/// ```
#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    request_body = CreateSessionRequestBody,
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Join code already taken", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "createSession"
)]
#[post("/sessions")]
pub async fn create_session(
    state: web::Data<HttpState>,
    payload: web::Json<CreateSessionRequestBody>,
) -> ApiResult<HttpResponse> {
    let CreateSessionRequestBody { code, password } = payload.into_inner();
    let response = state
        .sessions
        .create_session(CreateSessionRequest {
            code,
            password: SessionPassword::from_input(password),
        })
        .await?;
    Ok(HttpResponse::Created().json(CreateSessionResponseBody::from(response)))
}

/// Resolve a join code, checking the password and that the session is open.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/join",
    request_body = JoinSessionRequestBody,
    responses(
        (status = 200, description = "Joined", body = JoinSessionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Wrong or missing password", body = ErrorSchema),
        (status = 404, description = "Unknown code", body = ErrorSchema),
        (status = 410, description = "Session closed", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "joinSession"
)]
#[post("/sessions/join")]
pub async fn join_session(
    state: web::Data<HttpState>,
    payload: web::Json<JoinSessionRequestBody>,
) -> ApiResult<web::Json<JoinSessionResponseBody>> {
    let JoinSessionRequestBody { code, password } = payload.into_inner();
    let response = state
        .sessions
        .join_session(JoinSessionRequest {
            code,
            password: SessionPassword::from_input(password),
        })
        .await?;
    Ok(web::Json(JoinSessionResponseBody::from(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}",
    params(("session_id" = String, Path, format = "uuid", description = "Session identifier")),
    responses(
        (status = 200, description = "Session state", body = SessionView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Session not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "getSession"
)]
#[get("/sessions/{session_id}")]
pub async fn get_session(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SessionView>> {
    let session_id = parse_session_id(&path.into_inner(), SESSION_ID)?;
    let session = state.sessions_query.get_session(session_id).await?;
    Ok(web::Json(SessionView::from(&session)))
}

/// Add a player with no chips and no buy-ins.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/players",
    params(("session_id" = String, Path, format = "uuid", description = "Session identifier")),
    request_body = AddPlayerRequestBody,
    responses(
        (status = 201, description = "Player added", body = PlayerView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Session not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "addPlayer"
)]
#[post("/sessions/{session_id}/players")]
pub async fn add_player(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<AddPlayerRequestBody>,
) -> ApiResult<HttpResponse> {
    let session_id = parse_session_id(&path.into_inner(), SESSION_ID)?;
    let player = state
        .sessions
        .add_player(AddPlayerRequest {
            session_id,
            name: payload.into_inner().name,
        })
        .await?;
    Ok(HttpResponse::Created().json(PlayerView::from(&player)))
}

/// Overwrite a player's chip count. Last writer wins.
#[utoipa::path(
    put,
    path = "/api/v1/sessions/{session_id}/players/{player_id}/chips",
    params(
        ("session_id" = String, Path, format = "uuid", description = "Session identifier"),
        ("player_id" = String, Path, format = "uuid", description = "Player identifier")
    ),
    request_body = UpdateChipsRequestBody,
    responses(
        (status = 204, description = "Chips updated"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Session or player not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "updatePlayerChips"
)]
#[put("/sessions/{session_id}/players/{player_id}/chips")]
pub async fn update_player_chips(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<UpdateChipsRequestBody>,
) -> ApiResult<HttpResponse> {
    let (session_id, player_id) = path.into_inner();
    let session_id = parse_session_id(&session_id, SESSION_ID)?;
    let player_id = parse_player_id(&player_id, PLAYER_ID)?;
    let chips = require_non_negative(payload.chips, FieldName::new("chips"))?;
    state
        .sessions
        .update_player_chips(UpdatePlayerChipsRequest {
            session_id,
            player_id,
            chips,
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record a buy-in; the player's chips and total grow by the same amount.
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{session_id}/players/{player_id}/buy-ins",
    params(
        ("session_id" = String, Path, format = "uuid", description = "Session identifier"),
        ("player_id" = String, Path, format = "uuid", description = "Player identifier")
    ),
    request_body = AddBuyInRequestBody,
    responses(
        (status = 201, description = "Buy-in recorded", body = BuyInView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Session or player not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["sessions"],
    operation_id = "addBuyIn"
)]
#[post("/sessions/{session_id}/players/{player_id}/buy-ins")]
pub async fn add_buy_in(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
    payload: web::Json<AddBuyInRequestBody>,
) -> ApiResult<HttpResponse> {
    let (session_id, player_id) = path.into_inner();
    let session_id = parse_session_id(&session_id, SESSION_ID)?;
    let player_id = parse_player_id(&player_id, PLAYER_ID)?;
    let amount = require_positive(payload.amount, FieldName::new("amount"))?;
    let buy_in = state
        .sessions
        .add_buy_in(AddBuyInRequest {
            session_id,
            player_id,
            amount,
        })
        .await?;
    Ok(HttpResponse::Created().json(BuyInView::from(&buy_in)))
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
