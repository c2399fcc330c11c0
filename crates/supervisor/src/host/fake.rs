// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory remote host for tests.

// Test-support code: failures here abort the test
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{HostError, RemoteHost};

/// Scriptable [`RemoteHost`] holding tags, manifests, and tarballs in memory.
#[derive(Default)]
pub struct FakeHost {
    tags: Mutex<HashMap<String, Vec<String>>>,
    manifests: Mutex<HashMap<String, Vec<u8>>>,
    tarballs: Mutex<HashMap<String, Vec<u8>>>,
    fail_tags: AtomicBool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tags(&self, owner: &str, repo: &str, tags: &[&str]) {
        self.tags
            .lock()
            .insert(format!("{owner}/{repo}"), tags.iter().map(|t| t.to_string()).collect());
    }

    pub fn set_manifest(&self, owner: &str, repo: &str, tag: &str, manifest: &str) {
        self.manifests
            .lock()
            .insert(format!("{owner}/{repo}#{tag}"), manifest.as_bytes().to_vec());
    }

    pub fn set_tarball(&self, owner: &str, repo: &str, tag: &str, tarball: Vec<u8>) {
        self.tarballs.lock().insert(format!("{owner}/{repo}#{tag}"), tarball);
    }

    /// Make every subsequent tag listing fail with a transport error.
    pub fn fail_tag_listing(&self) {
        self.fail_tags.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteHost for FakeHost {
    async fn list_tags(&self, owner: &str, repo: &str) -> Result<Vec<String>, HostError> {
        if self.fail_tags.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable("tag listing unavailable".to_string()));
        }
        Ok(self.tags.lock().get(&format!("{owner}/{repo}")).cloned().unwrap_or_default())
    }

    async fn fetch_manifest(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Vec<u8>, HostError> {
        let key = format!("{owner}/{repo}#{tag}");
        self.manifests
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| HostError::Unavailable(format!("no manifest for {key}")))
    }

    async fn fetch_tarball(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Vec<u8>, HostError> {
        let key = format!("{owner}/{repo}#{tag}");
        self.tarballs
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| HostError::Unavailable(format!("no tarball for {key}")))
    }
}

/// Build a gzipped tarball with one top-level directory, the shape the
/// tarball endpoint serves.
pub fn tarball(top_dir: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{top_dir}/{path}"), contents.as_bytes())
            .unwrap_or_else(|e| panic!("appending {path}: {e}"));
    }
    let tar_bytes = builder.into_inner().unwrap_or_else(|e| panic!("finishing tar: {e}"));

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    if let Err(e) = encoder.write_all(&tar_bytes) {
        panic!("gzip write: {e}");
    }
    encoder.finish().unwrap_or_else(|e| panic!("gzip finish: {e}"))
}
