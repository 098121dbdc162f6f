//! Correlation identifier carried by every request and WebSocket feed.
//!
//! The active identifier lives in Tokio task-local storage so domain errors
//! can stamp it without threading it through each call. Task locals do not
//! follow `tokio::spawn`; wrap spawned work in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// UUID identifying one request or socket for log correlation.
///
/// # Examples
/// ```
/// use chiptally::TraceId;
///
/// let id = TraceId::generate();
/// assert_eq!(id.to_string().parse::<TraceId>().ok(), Some(id));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Identifier of the enclosing [`TraceId::scope`], if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Run `fut` with `trace_id` installed as the current identifier.
    ///
    /// # Examples
    /// ```
    /// use chiptally::TraceId;
    ///
    /// # let runtime = tokio::runtime::Builder::new_current_thread()
    /// #     .build()
    /// #     .expect("runtime");
    /// # runtime.block_on(async {
    /// let trace_id = TraceId::generate();
    /// let seen = TraceId::scope(trace_id, async { TraceId::current() }).await;
    /// assert_eq!(seen, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn scope_installs_and_removes_the_identifier() {
        let trace_id = TraceId::generate();
        let inside = TraceId::scope(trace_id, async { TraceId::current() }).await;

        assert_eq!(inside, Some(trace_id));
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn nested_scopes_shadow_the_outer_identifier() {
        let outer = TraceId::generate();
        let inner = TraceId::generate();
        let seen = TraceId::scope(outer, async move {
            let nested = TraceId::scope(inner, async { TraceId::current() }).await;
            (nested, TraceId::current())
        })
        .await;

        assert_eq!(seen, (Some(inner), Some(outer)));
    }

    #[rstest]
    #[case("00000000-0000-0000-0000-000000000000", true)]
    #[case(" 6f1c0a52-0f8e-4d55-9c1e-2b7a1f3d9e40 ", true)]
    #[case("not-a-uuid", false)]
    #[case("", false)]
    fn parses_uuid_text(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(raw.parse::<TraceId>().is_ok(), valid);
    }

    #[rstest]
    fn from_uuid_keeps_the_value() {
        let uuid = Uuid::new_v4();
        assert_eq!(TraceId::from_uuid(uuid).as_uuid(), &uuid);
    }
}
