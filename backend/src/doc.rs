//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: session endpoints and health probes from the inbound layer
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`])
//!   that provide OpenAPI definitions without coupling domain types to the
//!   utoipa framework, plus the session views
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::sessions::{
    AddBuyInRequestBody, AddPlayerRequestBody, BuyInView, CreateSessionRequestBody,
    CreateSessionResponseBody, JoinSessionRequestBody, JoinSessionResponseBody, LedgerView,
    PlayerView, SessionView, UpdateChipsRequestBody,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chiptally API",
        description = "Shared poker sessions: join codes, players, chip counts, and buy-ins."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::sessions::create_session,
        crate::inbound::http::sessions::join_session,
        crate::inbound::http::sessions::get_session,
        crate::inbound::http::sessions::add_player,
        crate::inbound::http::sessions::update_player_chips,
        crate::inbound::http::sessions::add_buy_in,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CreateSessionRequestBody,
        CreateSessionResponseBody,
        JoinSessionRequestBody,
        JoinSessionResponseBody,
        AddPlayerRequestBody,
        UpdateChipsRequestBody,
        AddBuyInRequestBody,
        SessionView,
        PlayerView,
        BuyInView,
        LedgerView,
    )),
    tags(
        (name = "sessions", description = "Poker sessions, players, and buy-ins"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn session_view_exposes_has_password_only() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let view = schemas.get("SessionView").expect("SessionView schema");

        assert_object_schema_has_field(view, "hasPassword");
        assert_object_schema_has_field(view, "ledger");
        match view {
            RefOr::T(Schema::Object(obj)) => {
                assert!(!obj.properties.contains_key("password"));
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/sessions")]
    #[case("/api/v1/sessions/join")]
    #[case("/api/v1/sessions/{session_id}")]
    #[case("/api/v1/sessions/{session_id}/players")]
    #[case("/api/v1/sessions/{session_id}/players/{player_id}/chips")]
    #[case("/api/v1/sessions/{session_id}/players/{player_id}/buy-ins")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_endpoint_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(
            doc.paths.paths.contains_key(path),
            "missing path {path}"
        );
    }
}
