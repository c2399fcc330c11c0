// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier resolution: pin a raw identifier to a concrete tag.

use tracing::debug;

use breach_core::{clean_version, Identifier, ModuleError};

use crate::error::SupervisorError;
use crate::host::RemoteHost;

/// Augment an identifier with a concrete tag.
///
/// Local identifiers must exist on disk. Remote identifiers resolve
/// against the host's tag listing: an explicit tag must be listed
/// (`master` is always accepted without a lookup); with no explicit tag
/// the highest semver-shaped tag wins, falling back to `master` when the
/// listing has none.
pub async fn augment(
    host: &dyn RemoteHost,
    id: &Identifier,
) -> Result<Identifier, SupervisorError> {
    match id {
        Identifier::Local(path) => {
            if tokio::fs::metadata(path).await.is_err() {
                return Err(ModuleError::InvalidPath(format!(
                    "local module missing: {}",
                    path.display()
                ))
                .into());
            }
            Ok(id.clone())
        }
        Identifier::Remote { owner, name, tag } => {
            if tag.as_deref() == Some("master") {
                return Ok(id.clone());
            }
            if let Some(requested) = tag {
                let tags = host.list_tags(owner, name).await?;
                if tags.iter().any(|t| t == requested) {
                    return Ok(id.clone());
                }
                return Err(ModuleError::InvalidPath(format!(
                    "tag {requested:?} not found for {owner}/{name}"
                ))
                .into());
            }

            let tags = host.list_tags(owner, name).await?;
            let best = tags
                .iter()
                .filter_map(|t| {
                    clean_version(t)
                        .and_then(|c| semver::Version::parse(&c).ok())
                        .map(|v| (v, t))
                })
                .max_by(|a, b| a.0.cmp(&b.0));
            let resolved = match best {
                Some((version, tag)) => {
                    debug!(%owner, %name, %tag, %version, "resolved to highest semver tag");
                    id.with_tag(tag.clone())
                }
                None => id.with_tag("master"),
            };
            Ok(resolved)
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
