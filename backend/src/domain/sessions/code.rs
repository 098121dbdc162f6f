//! Human-facing session join codes.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::SessionValidationError;

/// Length of generated codes and the maximum accepted length.
pub const SESSION_CODE_LEN: usize = 6;

/// Characters used when generating a random code.
pub const SESSION_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Join code shared between players to find a session.
///
/// Input is trimmed and upper-cased before validation, so `" abc12 "` and
/// `"ABC12"` name the same session.
///
/// # Examples
/// ```
/// use chiptally::domain::SessionCode;
///
/// let code = SessionCode::new(" abc123 ").expect("valid code");
/// assert_eq!(code.as_ref(), "ABC123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// Normalise and validate a user-supplied code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, SessionValidationError> {
        let normalised = code.as_ref().trim().to_ascii_uppercase();
        if normalised.is_empty() {
            return Err(SessionValidationError::EmptyCode);
        }
        if normalised.chars().count() > SESSION_CODE_LEN {
            return Err(SessionValidationError::CodeTooLong {
                max: SESSION_CODE_LEN,
            });
        }
        if !normalised.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SessionValidationError::CodeInvalidCharacters);
        }
        Ok(Self(normalised))
    }

    /// Draw a random code of [`SESSION_CODE_LEN`] characters.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..SESSION_CODE_LEN)
            .filter_map(|_| SESSION_CODE_ALPHABET.choose(&mut *rng).copied().map(char::from))
            .collect();
        Self(code)
    }
}

impl AsRef<str> for SessionCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<SessionCode> for String {
    fn from(value: SessionCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for SessionCode {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
