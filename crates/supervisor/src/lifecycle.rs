// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module lifecycle: run, crash-restart, and graceful kill with a
//! force-kill fallback.

use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use breach_core::Identifier;
use breach_wire::{Envelope, Payload, CORE_NAME};

use crate::dispatcher;
use crate::endpoint;
use crate::error::SupervisorError;
use crate::installer;
use crate::process::BusEvent;
use crate::state::{RunningModule, ShutdownEntry, MAX_RESTARTS};
use crate::supervisor::{ModuleSupervisor, Shared};

/// Readiness handshake event emitted by a freshly-spawned module.
const READY_EVENT: &str = "internal:ready";

impl ModuleSupervisor {
    /// Install (idempotently) and spawn a registered module.
    ///
    /// The path is parsed, never re-resolved: the record already carries a
    /// concrete tag, and activation must not depend on the network.
    pub async fn run_module(&self, path: &str) -> Result<(), SupervisorError> {
        let id = Identifier::parse(path)?;
        let record = self.shared.registry.get_by_path(&id.canonical())?;
        let dir = installer::install(&self.shared, &id).await?;

        {
            let mut state = self.shared.state.lock();
            let entry = state
                .running
                .entry(record.name.clone())
                .or_insert_with(|| RunningModule::new(record.path.clone()));
            if entry.process.is_some() {
                debug!(module = %record.name, "module already running");
                return Ok(());
            }
        }

        info!(module = %record.name, dir = %dir.display(), "spawning module");
        let process =
            self.shared.processes.spawn(&record.name, &dir, self.shared.bus_tx.clone()).await?;

        let mut state = self.shared.state.lock();
        match state.running.get_mut(&record.name) {
            Some(entry) => entry.process = Some(process),
            None => {
                // Killed while we were spawning; don't leak the child
                process.terminate();
            }
        }
        Ok(())
    }

    /// Gracefully stop a running module: `kill` RPC, then a force-kill
    /// after the configured deadline. Completes once the process has
    /// exited, or immediately when the module is not running.
    pub async fn kill_module(&self, path: &str) -> Result<(), SupervisorError> {
        let id = Identifier::parse(path)?;
        let record = self.shared.registry.get_by_path(&id.canonical())?;
        kill_by_name(&self.shared, &record.name).await;
        Ok(())
    }

    /// Supervisor shutdown: kill every running module in parallel and wait
    /// for all of them to acknowledge.
    pub async fn kill(&self) {
        let names: Vec<String> = self.shared.state.lock().running.keys().cloned().collect();
        let pending: Vec<_> =
            names.iter().filter_map(|name| begin_shutdown(&self.shared, name)).collect();
        info!(modules = pending.len(), "supervisor shutdown");
        futures_util::future::join_all(pending).await;
    }
}

/// Kill one module by running-set name, waiting for the exit.
pub(crate) async fn kill_by_name(shared: &Arc<Shared>, name: &str) {
    if let Some(done) = begin_shutdown(shared, name) {
        let _ = done.await;
    }
}

/// Move a module from the running set into the shutdown set and arm the
/// force-kill timer. Returns a completion that resolves when the exit is
/// observed, or `None` when there was nothing to stop.
fn begin_shutdown(shared: &Arc<Shared>, name: &str) -> Option<oneshot::Receiver<()>> {
    let mut state = shared.state.lock();
    let alive = state.running.get(name)?.process.is_some();
    if !alive {
        // Exited and not yet respawned; nothing to signal
        state.running.shift_remove(name);
        return None;
    }

    let mid = state.core.next_mid();
    let kill_call = Envelope::rpc_call(CORE_NAME, mid, name, "kill", Value::Null);
    if let Some(process) = state.running.get(name).and_then(|m| m.process.as_ref()) {
        process.send(&kill_call);
    }

    let entry = state.running.shift_remove(name)?;
    let (tx, rx) = oneshot::channel();
    state
        .shutdown
        .insert(name.to_string(), ShutdownEntry { process: entry.process, done: vec![tx] });
    drop(state);

    info!(module = %name, "graceful shutdown requested");
    arm_force_kill(shared, name.to_string());
    Some(rx)
}

/// After the kill deadline, terminate the process if the module is still
/// shutting down. The timer only touches entries it finds in the shutdown
/// set; a module that exited in time is long gone.
fn arm_force_kill(shared: &Arc<Shared>, name: String) {
    let deadline = shared.config.kill_timeout;
    let shared = Arc::downgrade(shared);
    tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        let Some(shared) = shared.upgrade() else { return };
        let state = shared.state.lock();
        if let Some(entry) = state.shutdown.get(&name) {
            warn!(module = %name, "graceful shutdown timed out, force-killing");
            if let Some(process) = &entry.process {
                process.terminate();
            }
        }
    });
}

/// The supervisor's event loop: drains the bus fed by every child pump.
pub(crate) async fn run_bus(shared: Weak<Shared>, mut bus_rx: mpsc::Receiver<BusEvent>) {
    while let Some(event) = bus_rx.recv().await {
        let Some(shared) = shared.upgrade() else { break };
        match event {
            BusEvent::Message { module, value } => handle_message(&shared, module, value),
            BusEvent::Exited { module } => handle_exit(&shared, &module),
        }
    }
    debug!("dispatch loop stopped");
}

/// Validate, identity-rewrite, and route one message from a child.
fn handle_message(shared: &Arc<Shared>, module: String, value: Value) {
    let mut envelope = match Envelope::from_value(&value) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(module = %module, error = %e, "dropping malformed message");
            return;
        }
    };
    // A child cannot spoof another sender
    envelope.hdr.src = module.clone();

    if let Payload::Event { typ, .. } = &envelope.payload {
        if typ == READY_EVENT {
            debug!(module = %module, "module ready");
            let shared = shared.clone();
            tokio::spawn(async move {
                match endpoint::core_call(&shared, &module, "init", Value::Null).await {
                    Ok(_) => debug!(module = %module, "module initialized"),
                    Err(e) => warn!(module = %module, error = %e, "module init failed"),
                }
            });
            return;
        }
    }

    dispatcher::dispatch(shared, envelope);
}

/// React to a child exit: complete an in-flight kill, restart within
/// budget, or declare the module dead for this session.
fn handle_exit(shared: &Arc<Shared>, module: &str) {
    let mut state = shared.state.lock();

    if let Some(mut entry) = state.shutdown.shift_remove(module) {
        info!(module = %module, "module shut down");
        for done in entry.done.drain(..) {
            let _ = done.send(());
        }
        return;
    }

    let Some(entry) = state.running.get_mut(module) else {
        return;
    };
    entry.process = None;

    if entry.restart_count < MAX_RESTARTS {
        entry.restart_count += 1;
        let path = entry.path.clone();
        warn!(module = %module, restart = entry.restart_count, "module exited, restarting");
        drop(state);
        let shared = shared.clone();
        tokio::spawn(async move {
            // Best effort; a failed restart leaves the module stopped
            let supervisor = ModuleSupervisor::from_shared(shared);
            if let Err(e) = supervisor.run_module(&path).await {
                warn!(error = %e, "module restart failed");
            }
        });
    } else {
        warn!(module = %module, "restart budget exhausted, removing module");
        state.running.shift_remove(module);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
