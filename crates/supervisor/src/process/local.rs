// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local process adapter: child creation, IPC pumps, termination.
//!
//! Each module runs as `<runner> <dir> --no-chrome` with length-prefixed
//! JSON envelopes over stdin/stdout. Three tasks per child: a writer
//! draining the outbox into stdin, a reader pumping stdout frames onto the
//! supervisor bus, and a waiter that reaps the process and reports its exit.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use breach_wire::{encode, read_message, write_message, Envelope};

use super::{BusEvent, ModuleProcess, ProcessAdapter, SpawnError};
use crate::env;

/// Spawns module children on this machine.
pub struct LocalAdapter {
    runner: String,
}

impl LocalAdapter {
    pub fn new() -> Self {
        Self { runner: env::module_runner() }
    }

    pub fn with_runner(runner: impl Into<String>) -> Self {
        Self { runner: runner.into() }
    }
}

impl Default for LocalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

struct LocalProcess {
    name: String,
    outbox: mpsc::UnboundedSender<Envelope>,
    kill: CancellationToken,
}

impl ModuleProcess for LocalProcess {
    fn send(&self, envelope: &Envelope) {
        if self.outbox.send(envelope.clone()).is_err() {
            debug!(module = %self.name, "dropping message to exited module");
        }
    }

    fn terminate(&self) {
        self.kill.cancel();
    }
}

#[async_trait]
impl ProcessAdapter for LocalAdapter {
    async fn spawn(
        &self,
        name: &str,
        dir: &Path,
        bus: mpsc::Sender<BusEvent>,
    ) -> Result<Box<dyn ModuleProcess>, SpawnError> {
        let mut child = Command::new(&self.runner)
            .arg(dir)
            .arg("--no-chrome")
            .current_dir(dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take().ok_or(SpawnError::MissingPipes)?;
        let stdout = child.stdout.take().ok_or(SpawnError::MissingPipes)?;
        let stderr = child.stderr.take().ok_or(SpawnError::MissingPipes)?;

        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let kill = CancellationToken::new();

        tokio::spawn(write_outbox(stdin, outbox_rx, name.to_string()));
        tokio::spawn(read_frames(stdout, bus.clone(), name.to_string()));
        tokio::spawn(log_stderr(stderr, name.to_string()));
        tokio::spawn(wait_for_exit(child, kill.clone(), bus, name.to_string()));

        debug!(module = %name, dir = %dir.display(), "module process spawned");
        Ok(Box::new(LocalProcess { name: name.to_string(), outbox: outbox_tx, kill }))
    }
}

/// Drain the outbox into the child's stdin.
async fn write_outbox(
    mut stdin: ChildStdin,
    mut outbox: mpsc::UnboundedReceiver<Envelope>,
    module: String,
) {
    while let Some(envelope) = outbox.recv().await {
        let bytes = match encode(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(module = %module, error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = write_message(&mut stdin, &bytes).await {
            debug!(module = %module, error = %e, "module stdin closed");
            break;
        }
    }
}

/// Pump framed messages from the child's stdout onto the bus.
///
/// Frames are forwarded in read order; the dispatcher sees messages from
/// one child exactly as the child sent them.
async fn read_frames(mut stdout: ChildStdout, bus: mpsc::Sender<BusEvent>, module: String) {
    loop {
        let bytes = match read_message(&mut stdout).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(module = %module, error = %e, "module stdout closed");
                break;
            }
        };
        let value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(module = %module, error = %e, "dropping non-JSON frame");
                continue;
            }
        };
        if bus.send(BusEvent::Message { module: module.clone(), value }).await.is_err() {
            break;
        }
    }
}

async fn log_stderr(stderr: ChildStderr, module: String) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(module = %module, "{line}");
    }
}

/// Reap the child, force-killing it if the handle's token fires first.
async fn wait_for_exit(
    mut child: Child,
    kill: CancellationToken,
    bus: mpsc::Sender<BusEvent>,
    module: String,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = kill.cancelled() => {
            warn!(module = %module, "force-killing module process");
            let _ = child.start_kill();
            child.wait().await
        }
    };
    match status {
        Ok(status) => debug!(module = %module, %status, "module process exited"),
        Err(e) => warn!(module = %module, error = %e, "failed to reap module process"),
    }
    let _ = bus.send(BusEvent::Exited { module }).await;
}
