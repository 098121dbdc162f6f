//! Shared validation helpers for inbound HTTP adapters.
//!
//! Rules enforced here belong to the client-facing contract rather than the
//! domain: chip counts may not be negative and buy-ins must be positive.

use actix_web::web;
use serde_json::json;

use crate::domain::{Error, PlayerId, SessionId};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    NegativeValue,
    NonPositiveValue,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::NegativeValue => "negative_value",
            ErrorCode::NonPositiveValue => "non_positive_value",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: impl Into<serde_json::Value>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_session_id(value: &str, field: FieldName) -> Result<SessionId, Error> {
    value.parse().map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_player_id(value: &str, field: FieldName) -> Result<PlayerId, Error> {
    value.parse().map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn require_non_negative(value: i64, field: FieldName) -> Result<i64, Error> {
    if value < 0 {
        return Err(field_error(
            field,
            format!("{} must not be negative", field.as_str()),
            ErrorCode::NegativeValue,
            value,
        ));
    }
    Ok(value)
}

pub(crate) fn require_positive(value: i64, field: FieldName) -> Result<i64, Error> {
    if value <= 0 {
        return Err(field_error(
            field,
            format!("{} must be greater than zero", field.as_str()),
            ErrorCode::NonPositiveValue,
            value,
        ));
    }
    Ok(value)
}

/// JSON extractor configuration reporting malformed bodies as domain errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed request body: {err}"))
            .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
            .into()
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;

    const CHIPS: FieldName = FieldName::new("chips");

    #[rstest]
    #[case(0, true)]
    #[case(250, true)]
    #[case(-1, false)]
    fn chips_may_not_be_negative(#[case] chips: i64, #[case] accepted: bool) {
        assert_eq!(require_non_negative(chips, CHIPS).is_ok(), accepted);
    }

    #[rstest]
    #[case(1, true)]
    #[case(0, false)]
    #[case(-5, false)]
    fn amounts_must_be_positive(#[case] amount: i64, #[case] accepted: bool) {
        assert_eq!(
            require_positive(amount, FieldName::new("amount")).is_ok(),
            accepted
        );
    }

    #[rstest]
    fn invalid_uuid_reports_field_details() {
        let err = parse_player_id("abc", FieldName::new("playerId")).expect_err("not a uuid");
        assert_eq!(err.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(
            err.details(),
            Some(&json!({"field": "playerId", "value": "abc", "code": "invalid_uuid"}))
        );
    }

    #[rstest]
    fn negative_chips_report_value() {
        let err = require_non_negative(-3, CHIPS).expect_err("negative");
        assert_eq!(err.message(), "chips must not be negative");
        assert_eq!(
            err.details().and_then(|d| d.get("value")),
            Some(&json!(-3))
        );
    }
}
