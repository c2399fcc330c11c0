// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for supervisor tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

// Test-support code: failures here abort the test
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::host::fake::FakeHost;
use crate::process::fake::{FakeModule, FakeProcessAdapter};
use crate::supervisor::ModuleSupervisor;

/// A supervisor wired to fake collaborators in a temp directory.
pub struct TestBed {
    pub supervisor: ModuleSupervisor,
    pub host: Arc<FakeHost>,
    pub processes: Arc<FakeProcessAdapter>,
    pub dir: tempfile::TempDir,
}

/// Build a ready-to-use supervisor over fakes, with a short kill deadline.
pub async fn testbed() -> TestBed {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        session_dir: dir.path().join("session"),
        off_the_record: false,
        modules_root: dir.path().join("modules"),
        kill_timeout: Duration::from_millis(100),
    };
    let host = Arc::new(FakeHost::new());
    let processes = Arc::new(FakeProcessAdapter::new());
    let supervisor =
        ModuleSupervisor::new(config, host.clone(), processes.clone()).expect("supervisor");
    supervisor.init().await.expect("init");
    TestBed { supervisor, host, processes, dir }
}

impl TestBed {
    /// Create a local module directory with a manifest; returns its
    /// identifier string.
    pub fn local_module(&self, name: &str) -> String {
        self.local_module_versioned(name, "1.0.0")
    }

    pub fn local_module_versioned(&self, name: &str, version: &str) -> String {
        let module_dir = self.dir.path().join("mods").join(name);
        std::fs::create_dir_all(&module_dir).unwrap();
        std::fs::write(
            module_dir.join("package.json"),
            format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
        )
        .unwrap();
        format!("local:{}", module_dir.display())
    }

    /// Add and run a local module, returning its path and fake process.
    pub async fn add_and_run(&self, name: &str) -> (String, FakeModule) {
        let path = self.local_module(name);
        self.supervisor.add(&path).await.unwrap();
        self.supervisor.run_module(&path).await.unwrap();
        let module = self.processes.module(name).unwrap();
        (path, module)
    }

    /// Names currently in the running set.
    pub fn running_names(&self) -> Vec<String> {
        self.supervisor.shared.state.lock().running.keys().cloned().collect()
    }

    /// Names currently in the shutdown set.
    pub fn shutdown_names(&self) -> Vec<String> {
        self.supervisor.shared.state.lock().shutdown.keys().cloned().collect()
    }

    /// Number of core RPCs still awaiting a reply.
    pub fn pending_rpc_count(&self) -> usize {
        self.supervisor.shared.state.lock().core.pending_rpcs.len()
    }
}

/// Poll a condition until it holds or a 2-second budget runs out.
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
