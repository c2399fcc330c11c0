// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session supervisor: registry operations, install, and wiring.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{info, warn};

use breach_core::{Identifier, Manifest, ModuleRecord, RawManifest};

use crate::config::Config;
use crate::error::SupervisorError;
use crate::host::{GithubHost, RemoteHost};
use crate::installer;
use crate::layout;
use crate::lifecycle;
use crate::process::{BusEvent, LocalAdapter, ProcessAdapter};
use crate::registry::{ModuleStatus, Registry};
use crate::resolver;
use crate::state::SupervisorState;

/// Capacity of the bus channel between child pumps and the dispatch loop.
const BUS_CAPACITY: usize = 256;

/// Everything a supervisor task needs, shared behind one `Arc`.
pub(crate) struct Shared {
    pub config: Config,
    pub registry: Registry,
    pub host: Arc<dyn RemoteHost>,
    pub processes: Arc<dyn ProcessAdapter>,
    pub state: Mutex<SupervisorState>,
    pub install_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    pub bus_tx: mpsc::Sender<BusEvent>,
    bus_rx: Mutex<Option<mpsc::Receiver<BusEvent>>>,
}

/// One session's module supervisor and message bus.
///
/// Cloning yields another handle to the same supervisor.
pub struct ModuleSupervisor {
    pub(crate) shared: Arc<Shared>,
}

impl Clone for ModuleSupervisor {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

impl ModuleSupervisor {
    /// Create a supervisor over explicit collaborators.
    pub fn new(
        config: Config,
        host: Arc<dyn RemoteHost>,
        processes: Arc<dyn ProcessAdapter>,
    ) -> Result<Self, SupervisorError> {
        let registry = Registry::open(&config)?;
        let (bus_tx, bus_rx) = mpsc::channel(BUS_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                registry,
                host,
                processes,
                state: Mutex::new(SupervisorState::default()),
                install_locks: Mutex::new(HashMap::new()),
                bus_tx,
                bus_rx: Mutex::new(Some(bus_rx)),
            }),
        })
    }

    /// Create a supervisor with the production collaborators.
    pub fn with_defaults(config: Config) -> Result<Self, SupervisorError> {
        Self::new(config, Arc::new(GithubHost::new()?), Arc::new(LocalAdapter::new()))
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Prepare the shared cache and start the dispatch loop.
    pub async fn init(&self) -> Result<(), SupervisorError> {
        tokio::fs::create_dir_all(&self.shared.config.modules_root).await?;
        if let Some(bus_rx) = self.shared.bus_rx.lock().take() {
            tokio::spawn(lifecycle::run_bus(Arc::downgrade(&self.shared), bus_rx));
        }
        Ok(())
    }

    /// Add a module to the session registry.
    ///
    /// This is the only operation that consults the remote host to pin a
    /// tag; the stored record path is fully resolved, and every later
    /// operation parses it without touching the network.
    pub async fn add(&self, path: &str) -> Result<ModuleRecord, SupervisorError> {
        let id = Identifier::parse(path)?;
        let id = resolver::augment(self.shared.host.as_ref(), &id).await?;
        self.shared.registry.check_path_conflicts(&id)?;
        let manifest = self.fetch_manifest(&id).await?;
        let record = ModuleRecord::new(&id, &manifest);
        self.shared.registry.insert(record.clone())?;
        info!(path = %record.path, name = %record.name, version = %record.version, "module added");
        Ok(record)
    }

    /// All registered modules, annotated with their running status.
    pub fn list(&self) -> Result<Vec<ModuleStatus>, SupervisorError> {
        let records = self.shared.registry.all()?;
        let state = self.shared.state.lock();
        Ok(records
            .into_iter()
            .map(|record| {
                let running = state.running.contains_key(&record.name);
                ModuleStatus { record, running }
            })
            .collect())
    }

    /// Ensure a registered module is present in the shared cache.
    pub async fn install(&self, path: &str) -> Result<(), SupervisorError> {
        let id = Identifier::parse(path)?;
        self.shared.registry.get_by_path(&id.canonical())?;
        installer::install(&self.shared, &id).await?;
        Ok(())
    }

    /// Remove a module from the registry, tearing down its process and its
    /// cached install.
    pub async fn remove(&self, path: &str) -> Result<(), SupervisorError> {
        let id = Identifier::parse(path)?;
        let record = self.shared.registry.get_by_path(&id.canonical())?;
        self.shared.registry.remove(&record.path)?;
        lifecycle::kill_by_name(&self.shared, &record.name).await;
        if !id.is_local() {
            let dir = layout::install_dir(&self.shared.config.modules_root, &id);
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(dir = %dir.display(), error = %e, "failed to remove module install");
                }
            }
        }
        info!(path = %record.path, "module removed");
        Ok(())
    }

    async fn fetch_manifest(&self, id: &Identifier) -> Result<Manifest, SupervisorError> {
        let bytes = match id {
            Identifier::Local(dir) => tokio::fs::read(dir.join("package.json")).await?,
            Identifier::Remote { owner, name, tag } => {
                let tag = tag.as_deref().unwrap_or("master");
                self.shared.host.fetch_manifest(owner, name, tag).await?
            }
        };
        let raw: RawManifest = serde_json::from_slice(&bytes)?;
        Ok(raw.validate()?)
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
