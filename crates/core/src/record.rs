// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted registry record for an added module.

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;
use crate::manifest::Manifest;

/// One registry document per added module, keyed by the canonical identifier.
///
/// `name` and `path` are each unique within a session; `owner`/`repo`/`tag`
/// are denormalized from remote identifiers so conflict checks and listings
/// never re-parse the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Canonical identifier string (primary key).
    pub path: String,
    /// Module name from the manifest.
    pub name: String,
    /// Cleaned semver version from the manifest.
    pub version: String,
    /// Reserved for future enable/disable.
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ModuleRecord {
    /// Build a record for a resolved identifier and validated manifest.
    pub fn new(id: &Identifier, manifest: &Manifest) -> Self {
        let (owner, repo, tag) = match id {
            Identifier::Remote { owner, name, tag } => {
                (Some(owner.clone()), Some(name.clone()), tag.clone())
            }
            Identifier::Local(_) => (None, None, None),
        };
        Self {
            path: id.canonical(),
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            active: true,
            owner,
            repo,
            tag,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
