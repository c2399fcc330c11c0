// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory process adapter for tests.
//!
//! No OS processes: a spawned "module" is a mailbox the test inspects, plus
//! methods to inject messages and exits onto the supervisor bus as if the
//! child had produced them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use breach_wire::Envelope;

use super::{BusEvent, ModuleProcess, ProcessAdapter, SpawnError};

/// Test handle to one spawned fake module.
#[derive(Clone)]
pub struct FakeModule {
    pub name: String,
    sent: Arc<Mutex<Vec<Envelope>>>,
    terminated: Arc<AtomicBool>,
    bus: mpsc::Sender<BusEvent>,
}

impl FakeModule {
    /// Everything the supervisor delivered to this module, in order.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Inject a message as if the child had written it to its pipe.
    pub async fn deliver(&self, envelope: &Envelope) {
        self.deliver_raw(envelope.to_value()).await;
    }

    pub async fn deliver_raw(&self, value: Value) {
        let _ = self.bus.send(BusEvent::Message { module: self.name.clone(), value }).await;
    }

    /// Simulate the child process exiting.
    pub async fn exit(&self) {
        let _ = self.bus.send(BusEvent::Exited { module: self.name.clone() }).await;
    }
}

struct FakeProcess {
    module: FakeModule,
}

impl ModuleProcess for FakeProcess {
    fn send(&self, envelope: &Envelope) {
        self.module.sent.lock().push(envelope.clone());
    }

    fn terminate(&self) {
        // First terminate wins; the simulated exit must fire exactly once.
        if self.module.terminated.swap(true, Ordering::SeqCst) {
            return;
        }
        let module = self.module.clone();
        tokio::spawn(async move { module.exit().await });
    }
}

#[derive(Default)]
struct Inner {
    spawned: Vec<FakeModule>,
    auto_exit: HashSet<String>,
}

/// Scriptable [`ProcessAdapter`] recording every spawn.
#[derive(Default)]
pub struct FakeProcessAdapter {
    inner: Mutex<Inner>,
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every spawned instance of `name` exit immediately, as a
    /// crash-looping module would.
    pub fn auto_exit(&self, name: &str) {
        self.inner.lock().auto_exit.insert(name.to_string());
    }

    /// Latest spawned instance of `name`.
    pub fn module(&self, name: &str) -> Option<FakeModule> {
        self.inner.lock().spawned.iter().rev().find(|m| m.name == name).cloned()
    }

    /// How many times `name` has been spawned (restarts included).
    pub fn spawn_count(&self, name: &str) -> usize {
        self.inner.lock().spawned.iter().filter(|m| m.name == name).count()
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn spawn(
        &self,
        name: &str,
        _dir: &Path,
        bus: mpsc::Sender<BusEvent>,
    ) -> Result<Box<dyn ModuleProcess>, SpawnError> {
        let module = FakeModule {
            name: name.to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
            terminated: Arc::new(AtomicBool::new(false)),
            bus,
        };
        let auto_exit = {
            let mut inner = self.inner.lock();
            inner.spawned.push(module.clone());
            inner.auto_exit.contains(name)
        };
        if auto_exit {
            let exiting = module.clone();
            tokio::spawn(async move { exiting.exit().await });
        }
        Ok(Box::new(FakeProcess { module }))
    }
}
