//! Driven port for the watchable document store holding session state.
//!
//! Documents are JSON objects addressed by a collection and an id. Updates
//! are expressed as [`DocumentPatch`] values targeting dotted field paths so
//! that adapters can apply them atomically, including conditional writes,
//! numeric increments, and array appends.

use std::fmt;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// A create targeted a document that already exists.
        AlreadyExists { key: String } => "document {key} already exists",
        /// A patch targeted a document that does not exist.
        NotFound { key: String } => "document {key} does not exist",
        /// A patch precondition did not hold.
        PreconditionFailed { key: String, path: String } =>
            "document {key} has no field {path}",
        /// A patch could not be applied to the document's current shape.
        InvalidPatch { message: String } => "patch rejected: {message}",
        /// The store could not be reached or refused the request.
        Unavailable { message: String } => "session store unavailable: {message}",
    }
}

/// Address of a document: `<collection>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    collection: String,
    id: String,
}

impl DocumentKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Dotted path into a document, for example `players.<id>.chips`.
///
/// # Examples
/// ```
/// use chiptally::domain::ports::FieldPath;
///
/// let path = FieldPath::root("players").child("p1").child("chips");
/// assert_eq!(path.to_string(), "players.p1.chips");
/// assert_eq!(path.segments().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    #[must_use]
    pub fn child(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Condition checked before any operation in a patch is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The field must be present.
    Exists(FieldPath),
}

/// A single field mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPatch {
    /// Overwrite the field, creating intermediate maps.
    Set { path: FieldPath, value: Value },
    /// Add to an integer field; a missing field counts as zero.
    Increment { path: FieldPath, by: i64 },
    /// Push onto an array field; a missing field counts as empty.
    Append { path: FieldPath, value: Value },
    /// Write the store's current time.
    ServerTimestamp { path: FieldPath },
}

/// Ordered set of preconditions and field mutations applied atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    preconditions: Vec<Precondition>,
    operations: Vec<FieldPatch>,
}

impl DocumentPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn require(mut self, path: FieldPath) -> Self {
        self.preconditions.push(Precondition::Exists(path));
        self
    }

    #[must_use]
    pub fn set(mut self, path: FieldPath, value: Value) -> Self {
        self.operations.push(FieldPatch::Set { path, value });
        self
    }

    #[must_use]
    pub fn increment(mut self, path: FieldPath, by: i64) -> Self {
        self.operations.push(FieldPatch::Increment { path, by });
        self
    }

    #[must_use]
    pub fn append(mut self, path: FieldPath, value: Value) -> Self {
        self.operations.push(FieldPatch::Append { path, value });
        self
    }

    #[must_use]
    pub fn server_timestamp(mut self, path: FieldPath) -> Self {
        self.operations.push(FieldPatch::ServerTimestamp { path });
        self
    }

    #[must_use]
    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    #[must_use]
    pub fn operations(&self) -> &[FieldPatch] {
        &self.operations
    }
}

/// Item yielded by a [`DocumentWatch`]: the document, or `None` if absent.
pub type WatchItem = Result<Option<Value>, SessionStoreError>;

/// Ordered stream of document states.
///
/// The first item is the state at subscription time. A slow consumer may
/// skip intermediate states but never observes them out of order. Dropping
/// the watch releases it.
pub struct DocumentWatch {
    inner: BoxStream<'static, WatchItem>,
}

impl DocumentWatch {
    pub fn new(inner: BoxStream<'static, WatchItem>) -> Self {
        Self { inner }
    }

    /// Watch that yields the given states then ends.
    pub fn from_states(states: Vec<WatchItem>) -> Self {
        Self::new(stream::iter(states).boxed())
    }

    /// Await the next state; `None` once the watch has ended.
    pub async fn next(&mut self) -> Option<WatchItem> {
        self.inner.next().await
    }
}

impl fmt::Debug for DocumentWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentWatch").finish_non_exhaustive()
    }
}

/// Port for reading, mutating, and observing stored documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a document, failing with `AlreadyExists` if the key is taken.
    ///
    /// Each path in `server_timestamps` is overwritten with the store's
    /// current time as part of the same write.
    async fn create(
        &self,
        key: &DocumentKey,
        document: Value,
        server_timestamps: Vec<FieldPath>,
    ) -> Result<(), SessionStoreError>;

    /// Read a document.
    async fn get(&self, key: &DocumentKey) -> Result<Option<Value>, SessionStoreError>;

    /// Apply a patch to an existing document atomically.
    async fn patch(&self, key: &DocumentKey, patch: DocumentPatch)
    -> Result<(), SessionStoreError>;

    /// Remove a document. Removing an absent document succeeds.
    async fn delete(&self, key: &DocumentKey) -> Result<(), SessionStoreError>;

    /// Observe a document's state over time.
    async fn watch(&self, key: &DocumentKey) -> Result<DocumentWatch, SessionStoreError>;
}

/// Fixture store that holds nothing and accepts every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSessionStore;

#[async_trait]
impl SessionStore for FixtureSessionStore {
    async fn create(
        &self,
        _key: &DocumentKey,
        _document: Value,
        _server_timestamps: Vec<FieldPath>,
    ) -> Result<(), SessionStoreError> {
        Ok(())
    }

    async fn get(&self, _key: &DocumentKey) -> Result<Option<Value>, SessionStoreError> {
        Ok(None)
    }

    async fn patch(
        &self,
        _key: &DocumentKey,
        _patch: DocumentPatch,
    ) -> Result<(), SessionStoreError> {
        Ok(())
    }

    async fn delete(&self, _key: &DocumentKey) -> Result<(), SessionStoreError> {
        Ok(())
    }

    async fn watch(&self, _key: &DocumentKey) -> Result<DocumentWatch, SessionStoreError> {
        Ok(DocumentWatch::from_states(vec![Ok(None)]))
    }
}
