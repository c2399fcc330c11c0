// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-facing error taxonomy for module management.

use thiserror::Error;

/// Errors surfaced to the host by module-management operations.
///
/// Each variant carries a stable machine-readable code (see [`ModuleError::code`])
/// so host UIs can branch without string-matching display text.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Identifier parse failure, unknown local path, or an explicit remote
    /// tag that does not exist.
    #[error("invalid module path: {0}")]
    InvalidPath(String),

    /// Manifest version absent or not a semver.
    #[error("invalid module version: {0}")]
    InvalidVersion(String),

    /// Manifest name absent or empty.
    #[error("invalid module name: {0}")]
    InvalidName(String),

    /// Add rejected because of a path, owner/name, or name collision.
    #[error("module conflict: {0}")]
    ModuleConflict(String),

    /// Operation on a path that is not in the registry.
    #[error("unknown module: {0}")]
    ModuleUnknown(String),
}

impl ModuleError {
    /// Stable error code for host consumption.
    pub fn code(&self) -> &'static str {
        match self {
            ModuleError::InvalidPath(_) => "module_manager:invalid_path",
            ModuleError::InvalidVersion(_) => "module_manager:invalid_version",
            ModuleError::InvalidName(_) => "module_manager:invalid_name",
            ModuleError::ModuleConflict(_) => "module_manager:module_conflict",
            ModuleError::ModuleUnknown(_) => "module_manager:module_unknown",
        }
    }
}
