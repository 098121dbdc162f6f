//! Origin allow-list for WebSocket upgrades.
//!
//! Entries are either exact origins (`https://poker.example`,
//! `http://localhost:3000`) or subdomain wildcards (`https://*.poker.example`).

use thiserror::Error;
use url::{Origin, Url};

/// Errors raised while parsing configured origins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginAllowListError {
    #[error("allowed origin `{value}` is not a valid URL: {message}")]
    InvalidUrl { value: String, message: String },
    #[error("allowed origin `{value}` has no host")]
    MissingHost { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AllowedOrigin {
    Exact(Origin),
    Subdomains { scheme: String, suffix: String },
}

impl AllowedOrigin {
    fn parse(value: &str) -> Result<Self, OriginAllowListError> {
        if let Some((scheme, domain)) = value.split_once("://*.") {
            let domain = domain.trim_end_matches('/');
            if domain.is_empty() {
                return Err(OriginAllowListError::MissingHost {
                    value: value.to_owned(),
                });
            }
            return Ok(Self::Subdomains {
                scheme: scheme.to_ascii_lowercase(),
                suffix: format!(".{}", domain.to_ascii_lowercase()),
            });
        }

        let url = Url::parse(value).map_err(|err| OriginAllowListError::InvalidUrl {
            value: value.to_owned(),
            message: err.to_string(),
        })?;
        if url.host_str().is_none() {
            return Err(OriginAllowListError::MissingHost {
                value: value.to_owned(),
            });
        }
        Ok(Self::Exact(url.origin()))
    }

    fn allows(&self, origin: &Url) -> bool {
        match self {
            Self::Exact(allowed) => *allowed == origin.origin(),
            Self::Subdomains { scheme, suffix } => {
                origin.scheme() == scheme
                    && origin
                        .host_str()
                        .is_some_and(|host| host.len() > suffix.len() && host.ends_with(suffix))
            }
        }
    }
}

/// Parsed set of origins permitted to open WebSocket connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginAllowList {
    entries: Vec<AllowedOrigin>,
}

impl OriginAllowList {
    /// Parse configured origin strings, failing on the first invalid entry.
    ///
    /// # Examples
    /// ```
    /// use chiptally::inbound::ws::OriginAllowList;
    /// use url::Url;
    ///
    /// let list = OriginAllowList::parse(["http://localhost:3000", "https://*.poker.example"])
    ///     .expect("valid origins");
    /// let origin = Url::parse("https://table.poker.example").expect("url");
    /// assert!(list.allows(&origin));
    /// ```
    pub fn parse<I, S>(values: I) -> Result<Self, OriginAllowListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = values
            .into_iter()
            .map(|value| AllowedOrigin::parse(value.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Returns true when `origin` matches any entry.
    pub fn allows(&self, origin: &Url) -> bool {
        self.entries.iter().any(|entry| entry.allows(origin))
    }
}
