//! Owns in-memory buffers for open editor documents.
//!
//! Consumers treat "open" contents as authoritative; once a document is
//! closed its contents fall back to whatever the compilation-unit factory
//! reads from disk. The tracker itself never touches disk.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use langsrv_uri::uri_key;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document already open: {0}")]
    AlreadyOpen(String),
}

#[derive(Debug, Clone)]
struct Document {
    uri: String,
    version: i32,
    text: String,
}

/// Thread-safe store of currently-open documents plus the set of URIs
/// changed since the last drain.
#[derive(Debug, Default)]
pub struct DocumentTracker {
    documents: Mutex<HashMap<String, Document>>,
    changed: Mutex<HashSet<String>>,
}

impl DocumentTracker {
    pub fn new() -> Self {
        Self { documents: Mutex::new(HashMap::new()), changed: Mutex::new(HashSet::new()) }
    }

    /// Records `uri` as open with the given initial text and version.
    ///
    /// # Errors
    /// Returns [`DocumentError::AlreadyOpen`] if the document is already
    /// tracked as open — callers should `change` it instead.
    pub fn open(&self, uri: &str, text: String, version: i32) -> Result<(), DocumentError> {
        let key = uri_key(uri);
        let mut docs = self.documents.lock();
        if docs.contains_key(&key) {
            return Err(DocumentError::AlreadyOpen(uri.to_string()));
        }
        docs.insert(key.clone(), Document { uri: uri.to_string(), version, text });
        drop(docs);
        self.changed.lock().insert(key);
        Ok(())
    }

    /// Replaces the contents of an open document. A no-op if `uri` is not
    /// currently open.
    pub fn change(&self, uri: &str, text: String, version: i32) {
        let key = uri_key(uri);
        let mut docs = self.documents.lock();
        if let Some(doc) = docs.get_mut(&key) {
            doc.text = text;
            doc.version = version;
        } else {
            return;
        }
        drop(docs);
        self.changed.lock().insert(key);
    }

    /// Removes `uri` from the open set and marks it changed, so the owning
    /// scope re-reads its contents from disk on next compile.
    pub fn close(&self, uri: &str) {
        let key = uri_key(uri);
        self.documents.lock().remove(&key);
        self.changed.lock().insert(key);
    }

    /// Returns the current in-memory text for `uri`, or `None` if it is
    /// not open.
    pub fn get(&self, uri: &str) -> Option<String> {
        let key = uri_key(uri);
        self.documents.lock().get(&key).map(|d| d.text.clone())
    }

    /// Returns the LSP version of `uri`, or `None` if it is not open.
    pub fn version(&self, uri: &str) -> Option<i32> {
        let key = uri_key(uri);
        self.documents.lock().get(&key).map(|d| d.version)
    }

    pub fn is_open(&self, uri: &str) -> bool {
        let key = uri_key(uri);
        self.documents.lock().contains_key(&key)
    }

    /// All currently-open document URIs (original, un-normalized form).
    pub fn open_uris(&self) -> Vec<String> {
        self.documents.lock().values().map(|d| d.uri.clone()).collect()
    }

    /// The set of URIs changed since the last `reset_changed`, without
    /// draining it.
    pub fn changed_uris(&self) -> Vec<String> {
        self.changed.lock().iter().cloned().collect()
    }

    /// Drains and returns the set of URIs changed since the last call.
    pub fn reset_changed(&self) -> Vec<String> {
        std::mem::take(&mut *self.changed.lock()).into_iter().collect()
    }

    /// True if any changed URI lies under `root` (a `file://` prefix,
    /// compared as normalized URI keys).
    pub fn has_changed_under(&self, root: &str) -> bool {
        let root_key = uri_key(root);
        self.changed.lock().iter().any(|u| u.starts_with(&root_key))
    }

    /// The subset of changed URIs that lie under `root`.
    pub fn changed_under(&self, root: &str) -> Vec<String> {
        let root_key = uri_key(root);
        self.changed.lock().iter().filter(|u| u.starts_with(&root_key)).cloned().collect()
    }

    /// Drains only the changed URIs under `root`, leaving changes under
    /// other roots (or outside any registered scope) untouched. Used by a
    /// scope that just recompiled its own subtree.
    pub fn clear_changed_under(&self, root: &str) {
        let root_key = uri_key(root);
        self.changed.lock().retain(|u| !u.starts_with(&root_key));
    }
}
