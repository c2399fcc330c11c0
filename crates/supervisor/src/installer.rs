// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Module installation into the shared on-disk cache.
//!
//! Idempotent: an already-present install directory short-circuits.
//! Installs for the same canonical path are serialized through a per-path
//! lock, so concurrent callers cannot interleave extraction.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use breach_core::{Identifier, ModuleError};

use crate::env;
use crate::error::SupervisorError;
use crate::layout;
use crate::supervisor::Shared;

/// Ensure the module named by `id` is present in the cache, returning its
/// install directory.
pub(crate) async fn install(shared: &Shared, id: &Identifier) -> Result<PathBuf, SupervisorError> {
    let target = layout::install_dir(&shared.config.modules_root, id);

    let lock = {
        let mut locks = shared.install_locks.lock();
        locks.entry(id.canonical()).or_default().clone()
    };
    let _guard = lock.lock().await;

    // A prior install may have completed while we waited on the lock
    if tokio::fs::metadata(&target).await.is_ok() {
        debug!(dir = %target.display(), "module already installed");
        return Ok(target);
    }

    match id {
        Identifier::Local(path) => {
            // Local modules are used in place and must already exist
            return Err(ModuleError::InvalidPath(format!(
                "local module missing: {}",
                path.display()
            ))
            .into());
        }
        Identifier::Remote { owner, name, tag } => {
            let tag = tag.as_deref().unwrap_or("master");
            info!(%owner, %name, tag, "fetching module tarball");
            let tarball = shared.host.fetch_tarball(owner, name, tag).await?;
            if let Err(e) = extract_tarball(&tarball, &target) {
                // Never leave a partially-populated install dir behind
                let _ = std::fs::remove_dir_all(&target);
                return Err(e);
            }
        }
    }

    install_dependencies(&target).await?;
    info!(dir = %target.display(), "module installed");
    Ok(target)
}

/// Unpack a gzipped tarball into `target`, stripping the single top-level
/// directory the tarball endpoint wraps everything in. Entries with
/// non-normal path components (`..`, absolute paths) are rejected.
fn extract_tarball(bytes: &[u8], target: &Path) -> Result<(), SupervisorError> {
    let decoder = GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);
    std::fs::create_dir_all(target)?;

    for entry in archive.entries().map_err(|e| SupervisorError::Archive(e.to_string()))? {
        let mut entry = entry.map_err(|e| SupervisorError::Archive(e.to_string()))?;
        let relpath = entry.path().map_err(|e| SupervisorError::Archive(e.to_string()))?.into_owned();

        for part in relpath.components() {
            if !matches!(part, Component::Normal(_)) {
                return Err(SupervisorError::Archive(format!(
                    "unsafe path in archive: {}",
                    relpath.display()
                )));
            }
        }

        let mut components = relpath.components();
        components.next();
        let stripped = components.as_path();
        if stripped.as_os_str().is_empty() {
            continue;
        }

        let dest = target.join(stripped);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&dest).map_err(|e| SupervisorError::Archive(e.to_string()))?;
    }
    Ok(())
}

/// Materialize the module's own dependencies with the external
/// package-install tool. Its stdout is ignored; failures propagate.
async fn install_dependencies(dir: &Path) -> Result<(), SupervisorError> {
    let bin = env::pkg_install_bin();
    debug!(dir = %dir.display(), bin = %bin, "installing module dependencies");
    let output = tokio::process::Command::new(&bin)
        .arg("install")
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;
    if !output.status.success() {
        return Err(SupervisorError::PackageInstall {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod tests;
