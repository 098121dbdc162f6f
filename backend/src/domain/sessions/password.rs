//! Optional plaintext session password.

use std::fmt;

use zeroize::Zeroize;

/// Password gating joins to a session.
///
/// Passwords are compared as plaintext. The value is wiped from memory on
/// drop and never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionPassword(String);

impl SessionPassword {
    /// Normalise optional user input; blank input means "no password".
    ///
    /// # Examples
    /// ```
    /// use chiptally::domain::SessionPassword;
    ///
    /// assert!(SessionPassword::from_input(Some("   ".to_owned())).is_none());
    /// let password = SessionPassword::from_input(Some(" secret ".to_owned()));
    /// assert_eq!(password.map(|p| p.expose().to_owned()), Some("secret".to_owned()));
    /// ```
    #[must_use]
    pub fn from_input(input: Option<String>) -> Option<Self> {
        let mut raw = input?;
        let trimmed = raw.trim();
        let password = (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()));
        raw.zeroize();
        password
    }

    /// Reveal the plaintext for storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Compare against a candidate supplied at join time.
    #[must_use]
    pub fn matches(&self, candidate: Option<&SessionPassword>) -> bool {
        candidate.is_some_and(|candidate| candidate.0 == self.0)
    }
}

impl fmt::Debug for SessionPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionPassword(***)")
    }
}

impl Drop for SessionPassword {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
