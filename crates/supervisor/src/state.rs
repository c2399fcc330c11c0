// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory supervisor state: the running and shutting-down module sets
//! and the synthetic core endpoint's tables.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use tokio::sync::oneshot;

use breach_wire::RpcError;

use crate::process::ModuleProcess;

/// A module is removed from the running set after this many consecutive
/// unexpected exits beyond the first.
pub(crate) const MAX_RESTARTS: u32 = 3;

/// One event subscription declared by a module.
pub(crate) struct Registration {
    /// Equals the message id of the originating register message.
    pub id: u64,
    /// Matched against a message's source name.
    pub source: Regex,
    /// Matched against a message's event type.
    pub typ: Regex,
}

/// Live state of one spawned module, keyed by module name.
pub(crate) struct RunningModule {
    /// Canonical identifier, used to re-run the module on restart.
    pub path: String,
    /// Cleared between exit and respawn.
    pub process: Option<Box<dyn ModuleProcess>>,
    pub restart_count: u32,
    pub registrations: Vec<Registration>,
}

impl RunningModule {
    pub fn new(path: String) -> Self {
        Self { path, process: None, restart_count: 0, registrations: Vec::new() }
    }
}

/// A module moved out of the running set by a graceful kill. Owns the
/// process handle until the exit is observed.
pub(crate) struct ShutdownEntry {
    pub process: Option<Box<dyn ModuleProcess>>,
    /// Completions to fire when the exit lands.
    pub done: Vec<oneshot::Sender<()>>,
}

/// A procedure served by the host on the core endpoint.
pub(crate) type Procedure =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, RpcError>> + Send + Sync>;

/// The synthetic core participant's tables. One per supervisor; never global.
#[derive(Default)]
pub(crate) struct CoreState {
    pub procedures: HashMap<String, Procedure>,
    pub pending_rpcs: HashMap<u64, oneshot::Sender<Result<Value, RpcError>>>,
    next_message_id: u64,
}

impl CoreState {
    /// Allocate the next core message id. Monotonic, never reused within a
    /// supervisor lifetime.
    pub fn next_mid(&mut self) -> u64 {
        self.next_message_id += 1;
        self.next_message_id
    }
}

/// All dispatcher-visible state, mutated only under the supervisor's lock.
///
/// `IndexMap` keeps the running-set scan in insertion order; event delivery
/// order across subscribers is part of the bus contract.
#[derive(Default)]
pub(crate) struct SupervisorState {
    pub running: IndexMap<String, RunningModule>,
    pub shutdown: IndexMap<String, ShutdownEntry>,
    pub core: CoreState,
}
