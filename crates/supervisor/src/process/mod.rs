// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module process adapter: spawning, IPC, and termination.
//!
//! The supervisor never touches an OS process directly; it spawns through a
//! [`ProcessAdapter`] and talks to the returned [`ModuleProcess`] handle.
//! Everything a child produces (messages and its eventual exit) arrives on
//! the supervisor's bus channel as a [`BusEvent`].

mod local;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use local::LocalAdapter;

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use breach_wire::Envelope;

/// One event from a module child process.
#[derive(Debug)]
pub enum BusEvent {
    /// A raw message read from the child. Validated and identity-rewritten
    /// by the supervisor before dispatch.
    Message { module: String, value: Value },
    /// The child process exited.
    Exited { module: String },
}

/// Errors spawning a module process.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to spawn module process: {0}")]
    Io(#[from] std::io::Error),

    #[error("module process is missing stdio pipes")]
    MissingPipes,
}

/// Handle to a live module process, exclusively owned by its
/// running-module entry.
pub trait ModuleProcess: Send + Sync {
    /// Enqueue one envelope for delivery to the child. Failures are logged
    /// and dropped; a dying child loses in-flight messages by design of the
    /// restart policy.
    fn send(&self, envelope: &Envelope);

    /// Force-terminate the child. The exit still surfaces as
    /// [`BusEvent::Exited`].
    fn terminate(&self);
}

/// Spawner for module processes.
#[async_trait]
pub trait ProcessAdapter: Send + Sync {
    /// Spawn the module rooted at `dir`, wiring its messages and exit to
    /// `bus` under the supervisor-assigned `name`.
    async fn spawn(
        &self,
        name: &str,
        dir: &Path,
        bus: mpsc::Sender<BusEvent>,
    ) -> Result<Box<dyn ModuleProcess>, SpawnError>;
}
