// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module manifest (`package.json`) parsing and semver cleaning.

use serde::Deserialize;

use crate::error::ModuleError;

/// A module manifest as read from disk or the remote host, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A validated manifest: non-empty name, cleaned semver version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub version: String,
}

impl RawManifest {
    /// Validate the manifest fields required by the registry.
    pub fn validate(self) -> Result<Manifest, ModuleError> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(ModuleError::InvalidName("manifest name missing".to_string())),
        };
        let version = self
            .version
            .as_deref()
            .and_then(clean_version)
            .ok_or_else(|| {
                ModuleError::InvalidVersion(format!(
                    "manifest version not a semver: {:?}",
                    self.version.as_deref().unwrap_or("")
                ))
            })?;
        Ok(Manifest { name, version })
    }
}

/// Normalize a loose version string to a canonical semver, if possible.
///
/// Accepts surrounding whitespace and a leading `v` or `=` (the forms found
/// in repository tags and hand-edited manifests).
pub fn clean_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches(['v', '=']);
    semver::Version::parse(trimmed).ok().map(|v| v.to_string())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
