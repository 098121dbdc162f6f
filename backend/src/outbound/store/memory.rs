//! In-process, watchable document store.
//!
//! Each document lives in a `tokio::sync::watch` channel so that writers
//! publish the full new state and every watcher sees it in order. All
//! mutations run under a single lock, which makes each create and patch
//! atomic with respect to concurrent writers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::SecondsFormat;
use futures_util::stream::{self, StreamExt};
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use super::document_ops::{PatchFailure, apply_patch};
use crate::domain::ports::{
    DocumentKey, DocumentPatch, DocumentWatch, FieldPath, SessionStore, SessionStoreError,
};

type DocumentMap = HashMap<DocumentKey, watch::Sender<Option<Value>>>;

/// Session store keeping every document in memory.
///
/// A key stays in the map while it holds a document or has live watchers.
pub struct InMemorySessionStore {
    documents: Arc<Mutex<DocumentMap>>,
    clock: Arc<dyn Clock>,
}

impl InMemorySessionStore {
    /// Create an empty store stamping server timestamps from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DocumentMap>, SessionStoreError> {
        self.documents
            .lock()
            .map_err(|_| SessionStoreError::unavailable("document lock poisoned"))
    }

    fn server_time(&self) -> Value {
        Value::String(
            self.clock
                .utc()
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        )
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

fn map_patch_failure(key: &DocumentKey, failure: PatchFailure) -> SessionStoreError {
    match failure {
        PatchFailure::Precondition(path) => {
            SessionStoreError::precondition_failed(key.to_string(), path.to_string())
        }
        PatchFailure::Invalid(message) => SessionStoreError::invalid_patch(message),
    }
}

/// Receiver half of a watch that evicts its key once nothing is left to see.
struct WatchedDocument {
    receiver: watch::Receiver<Option<Value>>,
    documents: Arc<Mutex<DocumentMap>>,
    key: DocumentKey,
}

impl Drop for WatchedDocument {
    fn drop(&mut self) {
        let Ok(mut documents) = self.documents.lock() else {
            return;
        };
        // `self.receiver` is still subscribed while this runs.
        let idle = documents.get(&self.key).is_some_and(|sender| {
            sender.receiver_count() <= 1 && sender.borrow().is_none()
        });
        if idle {
            documents.remove(&self.key);
            debug!(key = %self.key, "evicted unwatched empty document");
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        key: &DocumentKey,
        document: Value,
        server_timestamps: Vec<FieldPath>,
    ) -> Result<(), SessionStoreError> {
        let stamped = server_timestamps
            .into_iter()
            .fold(DocumentPatch::new(), DocumentPatch::server_timestamp);
        let mut documents = self.lock()?;
        if documents
            .get(key)
            .is_some_and(|sender| sender.borrow().is_some())
        {
            return Err(SessionStoreError::already_exists(key.to_string()));
        }
        let document = apply_patch(&document, &stamped, &self.server_time())
            .map_err(|failure| map_patch_failure(key, failure))?;
        documents
            .entry(key.clone())
            .or_insert_with(|| watch::channel(None).0)
            .send_replace(Some(document));
        debug!(%key, "document created");
        Ok(())
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Value>, SessionStoreError> {
        let documents = self.lock()?;
        Ok(documents
            .get(key)
            .and_then(|sender| sender.borrow().clone()))
    }

    async fn patch(
        &self,
        key: &DocumentKey,
        patch: DocumentPatch,
    ) -> Result<(), SessionStoreError> {
        let documents = self.lock()?;
        let not_found = || SessionStoreError::not_found(key.to_string());
        let sender = documents.get(key).ok_or_else(not_found)?;
        let patched = {
            let current = sender.borrow();
            let document = current.as_ref().ok_or_else(not_found)?;
            apply_patch(document, &patch, &self.server_time())
                .map_err(|failure| map_patch_failure(key, failure))?
        };
        sender.send_replace(Some(patched));
        Ok(())
    }

    async fn delete(&self, key: &DocumentKey) -> Result<(), SessionStoreError> {
        let mut documents = self.lock()?;
        if let Some(sender) = documents.get(key) {
            sender.send_replace(None);
            if sender.receiver_count() == 0 {
                documents.remove(key);
            }
            debug!(%key, "document deleted");
        }
        Ok(())
    }

    async fn watch(&self, key: &DocumentKey) -> Result<DocumentWatch, SessionStoreError> {
        let receiver = self
            .lock()?
            .entry(key.clone())
            .or_insert_with(|| watch::channel(None).0)
            .subscribe();
        let watched = WatchedDocument {
            receiver,
            documents: Arc::clone(&self.documents),
            key: key.clone(),
        };
        let states = stream::unfold((watched, true), |(mut watched, first)| async move {
            if !first {
                watched.receiver.changed().await.ok()?;
            }
            let state = watched.receiver.borrow_and_update().clone();
            Some((Ok(state), (watched, false)))
        });
        Ok(DocumentWatch::new(states.boxed()))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
