// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable per-session record of added modules.

use serde::Serialize;
use tracing::debug;

use breach_core::{Identifier, ModuleError, ModuleRecord};
use breach_store::{DocumentStore, FileStore, MemoryStore, Query, RemoveOptions, UpdateOptions};

use crate::config::Config;
use crate::error::SupervisorError;

/// A registry record annotated with its live status for `list`.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleStatus {
    #[serde(flatten)]
    pub record: ModuleRecord,
    pub running: bool,
}

/// Registry over the session's document store.
pub struct Registry {
    store: Box<dyn DocumentStore>,
}

impl Registry {
    /// Open the session registry: `<session-data>/modules.db`, or an
    /// in-memory container for off-the-record sessions.
    pub fn open(config: &Config) -> Result<Self, SupervisorError> {
        let store: Box<dyn DocumentStore> = if config.off_the_record {
            debug!("off-the-record session, registry kept in memory");
            Box::new(MemoryStore::new())
        } else {
            Box::new(FileStore::open(config.session_dir.join("modules.db"))?)
        };
        Ok(Self { store })
    }

    /// All records, in insertion order.
    pub fn all(&self) -> Result<Vec<ModuleRecord>, SupervisorError> {
        let docs = self.store.find(&Query::new())?;
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            records.push(serde_json::from_value(doc)?);
        }
        Ok(records)
    }

    /// Record for a canonical path, or `module_unknown`.
    pub fn get_by_path(&self, path: &str) -> Result<ModuleRecord, SupervisorError> {
        let docs = self.store.find(&Query::new().field("path", path))?;
        match docs.into_iter().next() {
            Some(doc) => Ok(serde_json::from_value(doc)?),
            None => Err(ModuleError::ModuleUnknown(path.to_string()).into()),
        }
    }

    /// Reject an add that collides with an existing record by canonical
    /// path, or by remote owner/name regardless of tag.
    pub fn check_path_conflicts(&self, id: &Identifier) -> Result<(), SupervisorError> {
        let canonical = id.canonical();
        for record in self.all()? {
            if record.path == canonical {
                return Err(ModuleError::ModuleConflict(format!("{canonical} already added")).into());
            }
            if let Identifier::Remote { owner, name, .. } = id {
                if record.owner.as_deref() == Some(owner) && record.repo.as_deref() == Some(name) {
                    return Err(ModuleError::ModuleConflict(format!(
                        "{owner}/{name} already added as {}",
                        record.path
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Upsert a record keyed by path, rejecting manifest-name collisions.
    pub fn insert(&self, record: ModuleRecord) -> Result<(), SupervisorError> {
        for existing in self.all()? {
            if existing.name == record.name && existing.path != record.path {
                return Err(ModuleError::ModuleConflict(format!(
                    "name {:?} already taken by {}",
                    record.name, existing.path
                ))
                .into());
            }
        }
        let doc = serde_json::to_value(&record)?;
        self.store.update(
            &Query::new().field("path", record.path.as_str()),
            doc,
            UpdateOptions { upsert: true },
        )?;
        Ok(())
    }

    /// Delete the record for a canonical path. Process teardown and on-disk
    /// cleanup are the supervisor's responsibility, not the registry's.
    pub fn remove(&self, path: &str) -> Result<(), SupervisorError> {
        self.store.remove(&Query::new().field("path", path), RemoveOptions::default())?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
