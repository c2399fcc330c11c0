// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote code-host adapter: tag listings, raw manifests, tarballs.

mod github;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use github::GithubHost;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from remote host operations.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("{0}")]
    Unavailable(String),
}

/// The three remote operations the supervisor needs from a code host.
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// All tag names for a repository, newest listing order preserved.
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>, HostError>;

    /// Raw manifest bytes at `owner/repo/tag/package.json`.
    async fn fetch_manifest(&self, owner: &str, repo: &str, tag: &str)
        -> Result<Vec<u8>, HostError>;

    /// The gzipped tarball of a repository at a tag.
    async fn fetch_tarball(&self, owner: &str, repo: &str, tag: &str)
        -> Result<Vec<u8>, HostError>;
}
