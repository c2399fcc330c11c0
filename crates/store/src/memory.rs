// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory document container for off-the-record sessions.

use parking_lot::Mutex;
use serde_json::Value;

use crate::{apply_remove, apply_update, DocumentStore, Query, RemoveOptions, StoreError, UpdateOptions};

/// Volatile store. Contents are lost when the session ends.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn find(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        Ok(self.docs.lock().iter().filter(|d| query.matches(d)).cloned().collect())
    }

    fn update(&self, query: &Query, doc: Value, opts: UpdateOptions) -> Result<usize, StoreError> {
        Ok(apply_update(&mut self.docs.lock(), query, doc, opts))
    }

    fn remove(&self, query: &Query, opts: RemoveOptions) -> Result<usize, StoreError> {
        Ok(apply_remove(&mut self.docs.lock(), query, opts))
    }
}
