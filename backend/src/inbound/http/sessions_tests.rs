//! Tests for session HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{
    FixtureSessionCommand, FixtureSessionQuery, MockSessionCommand, MockSessionQuery,
};
use crate::domain::{
    BuyInId, Error, PlayerId, PlayerName, SessionCode, SessionDraft, SessionId,
};
use crate::inbound::http::validation::json_config;

const SESSION: &str = "6f8e0a1c-2b3d-4e5f-8a9b-0c1d2e3f4a5b";
const PLAYER: &str = "1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d";

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .service(
            web::scope("/api/v1")
                .service(create_session)
                .service(join_session)
                .service(get_session)
                .service(add_player)
                .service(update_player_chips)
                .service(add_buy_in),
        )
}

fn command_state(command: MockSessionCommand) -> HttpState {
    HttpState::new(Arc::new(command), Arc::new(FixtureSessionQuery))
}

#[fixture]
fn sample_session() -> Session {
    let at = Utc
        .with_ymd_and_hms(2024, 11, 2, 19, 30, 0)
        .single()
        .expect("valid timestamp");
    let player_id: PlayerId = PLAYER.parse().expect("player id");
    let player = Player::new(player_id, PlayerName::new("Ada").expect("name"), at)
        .with_buy_in(BuyIn::new(BuyInId::random(), 1000, at));
    Session::new(SessionDraft {
        id: SESSION.parse().expect("session id"),
        code: SessionCode::new("FRIDAY").expect("code"),
        password: SessionPassword::from_input(Some("hunter2".to_owned())),
        players: vec![player],
        is_active: true,
        created_at: at,
        updated_at: at,
    })
}

async fn send(state: HttpState, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

#[rstest]
#[actix_web::test]
async fn create_session_returns_created_with_code() {
    let mut command = MockSessionCommand::new();
    command
        .expect_create_session()
        .withf(|request| {
            request.code.as_deref() == Some("friday")
                && request.password.as_ref().map(SessionPassword::expose) == Some("pw")
        })
        .times(1)
        .return_once(|_| {
            Ok(CreateSessionResponse {
                session_id: SESSION.parse().expect("session id"),
                code: SessionCode::new("FRIDAY").expect("code"),
            })
        });

    let (status, body) = send(
        command_state(command),
        actix_test::TestRequest::post()
            .uri("/api/v1/sessions")
            .set_json(json!({"code": "friday", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"sessionId": SESSION, "code": "FRIDAY"}));
}

#[rstest]
#[actix_web::test]
async fn create_session_treats_blank_password_as_none() {
    let mut command = MockSessionCommand::new();
    command
        .expect_create_session()
        .withf(|request| request.code.is_none() && request.password.is_none())
        .times(1)
        .return_once(|_| {
            Ok(CreateSessionResponse {
                session_id: SessionId::random(),
                code: SessionCode::new("ABC123").expect("code"),
            })
        });

    let (status, _) = send(
        command_state(command),
        actix_test::TestRequest::post()
            .uri("/api/v1/sessions")
            .set_json(json!({"password": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[rstest]
#[case(Error::invalid_request("invalid session code"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("incorrect password"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("no session"), StatusCode::NOT_FOUND)]
#[case(Error::inactive("session is no longer active"), StatusCode::GONE)]
#[case(Error::service_unavailable("store down"), StatusCode::SERVICE_UNAVAILABLE)]
#[actix_web::test]
async fn join_session_maps_domain_errors(#[case] error: Error, #[case] status: StatusCode) {
    let expected_code = error.code();
    let mut command = MockSessionCommand::new();
    command
        .expect_join_session()
        .times(1)
        .return_once(move |_| Err(error));

    let (actual, body) = send(
        command_state(command),
        actix_test::TestRequest::post()
            .uri("/api/v1/sessions/join")
            .set_json(json!({"code": "FRIDAY"})),
    )
    .await;

    assert_eq!(actual, status);
    assert_eq!(
        body.get("code"),
        Some(&serde_json::to_value(expected_code).expect("code serialises"))
    );
}

#[rstest]
#[actix_web::test]
async fn join_session_returns_session_id() {
    let mut command = MockSessionCommand::new();
    command
        .expect_join_session()
        .withf(|request| request.code == "friday" && request.password.is_none())
        .times(1)
        .return_once(|_| {
            Ok(JoinSessionResponse {
                session_id: SESSION.parse().expect("session id"),
            })
        });

    let (status, body) = send(
        command_state(command),
        actix_test::TestRequest::post()
            .uri("/api/v1/sessions/join")
            .set_json(json!({"code": "friday", "password": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"sessionId": SESSION}));
}

#[rstest]
#[actix_web::test]
async fn get_session_hides_password_and_reports_ledger(sample_session: Session) {
    let mut query = MockSessionQuery::new();
    query
        .expect_get_session()
        .times(1)
        .return_once(move |_| Ok(sample_session));
    let state = HttpState::new(Arc::new(FixtureSessionCommand), Arc::new(query));

    let (status, body) = send(
        state,
        actix_test::TestRequest::get().uri(&format!("/api/v1/sessions/{SESSION}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.to_string().contains("hunter2"));
    assert_eq!(body.get("password"), None);
    assert_eq!(body.get("hasPassword"), Some(&json!(true)));
    assert_eq!(
        body.get("ledger"),
        Some(&json!({"totalChips": 1000, "totalBuyIn": 1000, "discrepancy": 0}))
    );
    let player = body
        .get("players")
        .and_then(|players| players.get(0))
        .expect("one player");
    assert_eq!(player.get("id"), Some(&json!(PLAYER)));
    assert_eq!(player.get("profitLoss"), Some(&json!(0)));
}

#[rstest]
#[actix_web::test]
async fn get_session_rejects_malformed_id() {
    let (status, body) = send(
        HttpState::default(),
        actix_test::TestRequest::get().uri("/api/v1/sessions/not-a-uuid"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("details").and_then(|d| d.get("field")),
        Some(&json!("sessionId"))
    );
}

#[rstest]
#[actix_web::test]
async fn get_missing_session_is_not_found() {
    let (status, _) = send(
        HttpState::default(),
        actix_test::TestRequest::get().uri(&format!("/api/v1/sessions/{SESSION}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn add_player_returns_created_view() {
    let (status, body) = send(
        HttpState::default(),
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{SESSION}/players"))
            .set_json(json!({"name": "  Grace "})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("name"), Some(&json!("Grace")));
    assert_eq!(body.get("chips"), Some(&json!(0)));
    assert_eq!(body.get("totalBuyIn"), Some(&json!(0)));
    assert_eq!(body.get("buyIns"), Some(&json!([])));
}

#[rstest]
#[actix_web::test]
async fn update_chips_returns_no_content() {
    let mut command = MockSessionCommand::new();
    command
        .expect_update_player_chips()
        .withf(|request| request.chips == 0 && request.player_id.to_string() == PLAYER)
        .times(1)
        .return_once(|_| Ok(()));

    let (status, body) = send(
        command_state(command),
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{SESSION}/players/{PLAYER}/chips"))
            .set_json(json!({"chips": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[rstest]
#[actix_web::test]
async fn negative_chips_are_rejected_before_the_service() {
    let mut command = MockSessionCommand::new();
    command.expect_update_player_chips().never();

    let (status, body) = send(
        command_state(command),
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/sessions/{SESSION}/players/{PLAYER}/chips"))
            .set_json(json!({"chips": -10})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("details").and_then(|d| d.get("code")),
        Some(&json!("negative_value"))
    );
}

#[rstest]
#[case(0)]
#[case(-100)]
#[actix_web::test]
async fn non_positive_buy_ins_are_rejected(#[case] amount: i64) {
    let mut command = MockSessionCommand::new();
    command.expect_add_buy_in().never();

    let (status, _) = send(
        command_state(command),
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{SESSION}/players/{PLAYER}/buy-ins"))
            .set_json(json!({"amount": amount})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn add_buy_in_returns_created_view() {
    let (status, body) = send(
        HttpState::default(),
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{SESSION}/players/{PLAYER}/buy-ins"))
            .set_json(json!({"amount": 500})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.get("amount"), Some(&json!(500)));
    assert!(body.get("timestamp").is_some_and(Value::is_string));
}

#[rstest]
#[actix_web::test]
async fn unknown_player_maps_to_not_found() {
    let mut command = MockSessionCommand::new();
    command
        .expect_add_buy_in()
        .times(1)
        .return_once(|_| Err(Error::not_found("player not found")));

    let (status, _) = send(
        command_state(command),
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{SESSION}/players/{PLAYER}/buy-ins"))
            .set_json(json!({"amount": 500})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn malformed_body_is_an_invalid_request() {
    let (status, body) = send(
        HttpState::default(),
        actix_test::TestRequest::post()
            .uri(&format!("/api/v1/sessions/{SESSION}/players/{PLAYER}/buy-ins"))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"amount\": \"lots\"}"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("code"), Some(&json!("invalid_request")));
}
