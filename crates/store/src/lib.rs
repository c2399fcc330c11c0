// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! breach-store: a small JSON document container.
//!
//! Documents are JSON objects matched by exact top-level field equality.
//! Two backends: [`FileStore`] persists one document per line and rewrites
//! the file on every mutation; [`MemoryStore`] backs off-the-record sessions
//! and never touches disk.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde_json::{Map, Value};
use thiserror::Error;

/// Store I/O and codec errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Exact-match query over top-level document fields.
///
/// An empty query matches every document.
#[derive(Debug, Clone, Default)]
pub struct Query(Map<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.0.iter().all(|(key, expected)| doc.get(key) == Some(expected))
    }
}

/// Options for [`DocumentStore::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Insert the document when no existing document matches.
    pub upsert: bool,
}

/// Options for [`DocumentStore::remove`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveOptions {
    /// Remove every matching document instead of only the first.
    pub multi: bool,
}

/// The document container contract the registry is written against.
pub trait DocumentStore: Send + Sync {
    /// All documents matching the query, in insertion order.
    fn find(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Replace the first matching document with `doc`; with `upsert`,
    /// insert when nothing matches. Returns the number of documents written.
    fn update(&self, query: &Query, doc: Value, opts: UpdateOptions) -> Result<usize, StoreError>;

    /// Remove matching documents. Returns the number removed.
    fn remove(&self, query: &Query, opts: RemoveOptions) -> Result<usize, StoreError>;
}

/// Shared in-memory mutation logic for both backends.
pub(crate) fn apply_update(
    docs: &mut Vec<Value>,
    query: &Query,
    doc: Value,
    opts: UpdateOptions,
) -> usize {
    if let Some(existing) = docs.iter_mut().find(|d| query.matches(d)) {
        *existing = doc;
        return 1;
    }
    if opts.upsert {
        docs.push(doc);
        return 1;
    }
    0
}

pub(crate) fn apply_remove(docs: &mut Vec<Value>, query: &Query, opts: RemoveOptions) -> usize {
    if opts.multi {
        let before = docs.len();
        docs.retain(|d| !query.matches(d));
        before - docs.len()
    } else {
        match docs.iter().position(|d| query.matches(d)) {
            Some(idx) => {
                docs.remove(idx);
                1
            }
            None => 0,
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
