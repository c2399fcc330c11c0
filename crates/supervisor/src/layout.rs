// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of the shared module cache.

use std::path::{Path, PathBuf};

use breach_core::Identifier;

/// Install directory for a resolved identifier.
///
/// Remote modules live under `<root>/<owner>/<name>#<tag>`; local modules
/// are used in place and never copied into the cache.
pub fn install_dir(root: &Path, id: &Identifier) -> PathBuf {
    match id {
        Identifier::Remote { owner, name, tag } => {
            let tag = tag.as_deref().unwrap_or("master");
            root.join(owner).join(format!("{name}#{tag}"))
        }
        Identifier::Local(path) => path.clone(),
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
