// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed document container.
//!
//! One JSON document per line. The whole file is loaded at open and
//! rewritten through a temp-file rename on every mutation, so a crash
//! mid-write never leaves a half-updated database behind.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::{apply_remove, apply_update, DocumentStore, Query, RemoveOptions, StoreError, UpdateOptions};

/// Persistent store at a fixed path (e.g. `<session-data>/modules.db`).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    docs: Mutex<Vec<Value>>,
}

impl FileStore {
    /// Open the store, creating parent directories as needed. A missing
    /// file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let docs = match fs::read_to_string(&path) {
            Ok(contents) => {
                let mut docs = Vec::new();
                for line in contents.lines().filter(|l| !l.trim().is_empty()) {
                    docs.push(serde_json::from_str(line)?);
                }
                docs
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), documents = docs.len(), "opened document store");
        Ok(Self { path, docs: Mutex::new(docs) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the backing file from the in-memory documents.
    fn persist(&self, docs: &[Value]) -> Result<(), StoreError> {
        let mut contents = String::new();
        for doc in docs {
            contents.push_str(&serde_json::to_string(doc)?);
            contents.push('\n');
        }

        let tmp = self.path.with_extension("db.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn find(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        Ok(self.docs.lock().iter().filter(|d| query.matches(d)).cloned().collect())
    }

    fn update(&self, query: &Query, doc: Value, opts: UpdateOptions) -> Result<usize, StoreError> {
        let mut docs = self.docs.lock();
        let written = apply_update(&mut docs, query, doc, opts);
        if written > 0 {
            self.persist(&docs)?;
        }
        Ok(written)
    }

    fn remove(&self, query: &Query, opts: RemoveOptions) -> Result<usize, StoreError> {
        let mut docs = self.docs.lock();
        let removed = apply_remove(&mut docs, query, opts);
        if removed > 0 {
            self.persist(&docs)?;
        }
        Ok(removed)
    }
}
