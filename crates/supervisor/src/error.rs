// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor error type: the module-management taxonomy plus collaborator
//! failures, which propagate with their underlying cause.

use thiserror::Error;

use breach_core::ModuleError;

use crate::host::HostError;
use crate::process::SpawnError;

/// Errors surfaced by supervisor operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Module(#[from] ModuleError),

    #[error("store error: {0}")]
    Store(#[from] breach_store::StoreError),

    #[error("remote host error: {0}")]
    Host(#[from] HostError),

    #[error("spawn error: {0}")]
    Spawn(#[from] SpawnError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt archive: {0}")]
    Archive(String),

    #[error("package install failed ({status}): {stderr}")]
    PackageInstall { status: String, stderr: String },

    #[error("could not determine modules directory")]
    NoModulesDir,
}

impl SupervisorError {
    /// Stable machine-readable code for module-management failures.
    /// Collaborator errors carry their own cause and have no code.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            SupervisorError::Module(e) => Some(e.code()),
            _ => None,
        }
    }
}
