// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub-backed implementation of [`RemoteHost`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{HostError, RemoteHost};

/// The tarball endpoint rejects requests without a User-Agent.
const USER_AGENT: &str = concat!("breach-modules/", env!("CARGO_PKG_VERSION"));

/// Remote host client for `github.com`.
pub struct GithubHost {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

impl GithubHost {
    pub fn new() -> Result<Self, HostError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: String) -> Result<reqwest::Response, HostError> {
        debug!(url = %url, "remote host fetch");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(HostError::Status { status: response.status().as_u16(), url });
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteHost for GithubHost {
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>, HostError> {
        let url = format!("https://api.github.com/repos/{owner}/{repo}/tags");
        let tags: Vec<TagEntry> = self.get(url).await?.json().await?;
        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    async fn fetch_manifest(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Vec<u8>, HostError> {
        let url = format!("https://raw.githubusercontent.com/{owner}/{repo}/{tag}/package.json");
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }

    async fn fetch_tarball(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Vec<u8>, HostError> {
        let url = format!("https://api.github.com/repos/{owner}/{repo}/tarball/{tag}");
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}
