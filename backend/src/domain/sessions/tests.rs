//! Unit tests for the session domain types.

use chrono::{DateTime, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rstest::{fixture, rstest};
use serde_json::json;

use super::document::{SessionDocument, buy_ins_path, chips_path, session_key};
use super::*;

#[fixture]
fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn player_with(chips: i64, buy_ins: &[i64], at: DateTime<Utc>) -> Player {
    let mut player = Player::new(
        PlayerId::random(),
        PlayerName::new("Ada").expect("valid name"),
        at,
    );
    for amount in buy_ins {
        player.buy_ins.push(BuyIn::new(BuyInId::random(), *amount, at));
        player.total_buy_in += amount;
    }
    player.chips = chips;
    player
}

fn session_with(
    password: Option<&str>,
    players: Vec<Player>,
    at: DateTime<Utc>,
) -> Session {
    Session::new(SessionDraft {
        id: SessionId::random(),
        code: SessionCode::new("ABC123").expect("valid code"),
        password: SessionPassword::from_input(password.map(str::to_owned)),
        players,
        is_active: true,
        created_at: at,
        updated_at: at,
    })
}

#[rstest]
#[case("abc123", "ABC123")]
#[case("  xy9 ", "XY9")]
#[case("Q", "Q")]
fn session_code_normalises_input(#[case] raw: &str, #[case] expected: &str) {
    let code = SessionCode::new(raw).expect("valid code");
    assert_eq!(code.as_ref(), expected);
}

#[rstest]
#[case("", SessionValidationError::EmptyCode)]
#[case("   ", SessionValidationError::EmptyCode)]
#[case("ABCDEFG", SessionValidationError::CodeTooLong { max: SESSION_CODE_LEN })]
#[case("AB-12", SessionValidationError::CodeInvalidCharacters)]
#[case("ÄBC", SessionValidationError::CodeInvalidCharacters)]
fn session_code_rejects_invalid_input(
    #[case] raw: &str,
    #[case] expected: SessionValidationError,
) {
    assert_eq!(SessionCode::new(raw), Err(expected));
}

#[rstest]
fn generated_codes_use_the_code_alphabet() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..64 {
        let code = SessionCode::generate(&mut rng);
        assert_eq!(code.as_ref().len(), SESSION_CODE_LEN);
        assert!(code.as_ref().bytes().all(|b| SESSION_CODE_ALPHABET.contains(&b)));
        assert_eq!(SessionCode::new(code.as_ref()).as_ref(), Ok(&code));
    }
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("  \t "))]
fn blank_passwords_mean_no_password(#[case] raw: Option<&str>) {
    assert!(SessionPassword::from_input(raw.map(str::to_owned)).is_none());
}

#[rstest]
fn password_debug_is_redacted() {
    let password =
        SessionPassword::from_input(Some("hunter2".to_owned())).expect("password present");
    let rendered = format!("{password:?}");
    assert!(!rendered.contains("hunter2"));
}

#[rstest]
#[case(None, None, true)]
#[case(None, Some("anything"), true)]
#[case(Some("pw"), Some("pw"), true)]
#[case(Some("pw"), Some(" pw "), true)]
#[case(Some("pw"), Some("PW"), false)]
#[case(Some("pw"), None, false)]
#[case(Some("pw"), Some(""), false)]
fn accepts_password_compares_plaintext(
    created_at: DateTime<Utc>,
    #[case] stored: Option<&str>,
    #[case] supplied: Option<&str>,
    #[case] accepted: bool,
) {
    let session = session_with(stored, Vec::new(), created_at);
    let candidate = SessionPassword::from_input(supplied.map(str::to_owned));
    assert_eq!(session.accepts_password(candidate.as_ref()), accepted);
}

#[rstest]
#[case("  Ada ", Ok("Ada"))]
#[case("", Err(SessionValidationError::EmptyPlayerName))]
#[case("   ", Err(SessionValidationError::EmptyPlayerName))]
fn player_names_are_trimmed(
    #[case] raw: &str,
    #[case] expected: Result<&str, SessionValidationError>,
) {
    let name = PlayerName::new(raw).map(|name| name.to_string());
    assert_eq!(name, expected.map(str::to_owned));
}

#[rstest]
fn player_names_have_a_length_limit() {
    let long = "x".repeat(PLAYER_NAME_MAX + 1);
    assert_eq!(
        PlayerName::new(long),
        Err(SessionValidationError::PlayerNameTooLong {
            max: PLAYER_NAME_MAX
        })
    );
    assert!(PlayerName::new("x".repeat(PLAYER_NAME_MAX)).is_ok());
}

#[rstest]
fn new_player_starts_empty(created_at: DateTime<Utc>) {
    let player = Player::new(
        PlayerId::random(),
        PlayerName::new("Bo").expect("valid name"),
        created_at,
    );
    assert_eq!(player.chips(), 0);
    assert_eq!(player.total_buy_in(), 0);
    assert!(player.buy_ins().is_empty());
    assert_eq!(player.profit_loss(), 0);
}

#[rstest]
#[case(150, &[100], 50)]
#[case(0, &[100, 50], -150)]
#[case(300, &[100, 100, 100], 0)]
fn profit_loss_is_chips_minus_total_buy_in(
    created_at: DateTime<Utc>,
    #[case] chips: i64,
    #[case] buy_ins: &[i64],
    #[case] expected: i64,
) {
    let player = player_with(chips, buy_ins, created_at);
    assert_eq!(player.profit_loss(), expected);
    assert_eq!(player.recorded_buy_in_sum(), player.total_buy_in());
}

#[rstest]
fn buy_in_credits_chips_and_total(created_at: DateTime<Utc>) {
    let player = player_with(40, &[], created_at)
        .with_buy_in(BuyIn::new(BuyInId::random(), 100, created_at))
        .with_buy_in(BuyIn::new(BuyInId::random(), 60, created_at));
    assert_eq!(player.chips(), 200);
    assert_eq!(player.total_buy_in(), 160);
    assert_eq!(player.buy_ins().len(), 2);
    assert_eq!(player.profit_loss(), 40);
}

#[rstest]
fn ledger_sums_every_player(created_at: DateTime<Utc>) {
    let session = session_with(
        None,
        vec![
            player_with(250, &[100], created_at),
            player_with(0, &[100, 50], created_at),
        ],
        created_at,
    );
    let ledger = session.ledger();
    assert_eq!(ledger.total_chips, 250);
    assert_eq!(ledger.total_buy_in, 250);
    assert_eq!(ledger.discrepancy(), 0);
}

#[rstest]
fn session_document_uses_camel_case_layout(created_at: DateTime<Utc>) {
    let player = player_with(120, &[100], created_at);
    let player_id = player.id();
    let session = session_with(Some("pw"), vec![player], created_at);

    let value = serde_json::to_value(SessionDocument::from(&session)).expect("serialise");
    let stored_player = &value["players"][player_id.to_string()];
    assert_eq!(value["isActive"], json!(true));
    assert_eq!(value["code"], json!("ABC123"));
    assert_eq!(value["password"], json!("pw"));
    assert_eq!(stored_player["chips"], json!(120));
    assert_eq!(stored_player["totalBuyIn"], json!(100));
    assert_eq!(stored_player["buyIns"][0]["amount"], json!(100));

    let decoded: SessionDocument = serde_json::from_value(value).expect("deserialise");
    let restored = Session::try_from(decoded).expect("valid session");
    assert_eq!(restored, session);
}

#[rstest]
fn session_document_rejects_mismatched_player_keys(created_at: DateTime<Utc>) {
    let player = player_with(0, &[], created_at);
    let session = session_with(None, vec![player], created_at);
    let mut document = SessionDocument::from(&session);
    let (_, stored) = document
        .players
        .pop_first()
        .expect("one player present");
    document.players.insert("not-the-id".to_owned(), stored);

    let err = Session::try_from(document).expect_err("key mismatch");
    assert!(matches!(err, SessionValidationError::PlayerKeyMismatch { .. }));
}

#[rstest]
fn field_paths_address_nested_player_fields() {
    let id = PlayerId::random();
    assert_eq!(chips_path(id).to_string(), format!("players.{id}.chips"));
    assert_eq!(buy_ins_path(id).to_string(), format!("players.{id}.buyIns"));
    let key = session_key(SessionId::random());
    assert_eq!(key.collection(), "sessions");
}

#[rstest]
fn identifiers_reject_malformed_input() {
    let err = "nope".parse::<PlayerId>().expect_err("not a uuid");
    assert_eq!(
        err,
        SessionValidationError::InvalidIdentifier {
            value: "nope".to_owned()
        }
    );
}
