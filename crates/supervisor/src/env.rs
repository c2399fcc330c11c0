// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the supervisor crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SupervisorError;

/// Resolve the shared modules root: `BREACH_MODULES_DIR` > `<data>/breach/modules`.
///
/// The root is shared by every session on the host; installs only ever
/// create new `owner/name#tag` directories under it.
pub fn modules_root() -> Result<PathBuf, SupervisorError> {
    if let Ok(dir) = std::env::var("BREACH_MODULES_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let data = dirs::data_dir().ok_or(SupervisorError::NoModulesDir)?;
    Ok(data.join("breach").join("modules"))
}

/// Graceful-kill deadline (default 5s, configurable via `BREACH_KILL_TIMEOUT_MS`).
pub fn kill_timeout() -> Duration {
    std::env::var("BREACH_KILL_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Program used to boot a module process (default `node`).
pub fn module_runner() -> String {
    std::env::var("BREACH_MODULE_RUNNER").unwrap_or_else(|_| "node".to_string())
}

/// External package-install tool invoked after a fresh install (default `npm`).
pub fn pkg_install_bin() -> String {
    std::env::var("BREACH_PKG_INSTALL_BIN").unwrap_or_else(|_| "npm".to_string())
}
