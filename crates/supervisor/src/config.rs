// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session supervisor configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::env;
use crate::error::SupervisorError;

/// Configuration for one session's supervisor.
#[derive(Debug, Clone)]
pub struct Config {
    /// Session data directory; holds `modules.db` for persistent sessions.
    pub session_dir: PathBuf,
    /// Off-the-record sessions keep the registry in memory only.
    pub off_the_record: bool,
    /// Process-wide shared install root.
    pub modules_root: PathBuf,
    /// Graceful-kill deadline before force-termination.
    pub kill_timeout: Duration,
}

impl Config {
    /// Load configuration for a session, resolving shared paths from the
    /// environment.
    pub fn load(session_dir: impl Into<PathBuf>) -> Result<Self, SupervisorError> {
        Ok(Self {
            session_dir: session_dir.into(),
            off_the_record: false,
            modules_root: env::modules_root()?,
            kill_timeout: env::kill_timeout(),
        })
    }

    /// Same as [`Config::load`] but without on-disk session state.
    pub fn load_off_the_record(session_dir: impl Into<PathBuf>) -> Result<Self, SupervisorError> {
        let mut config = Self::load(session_dir)?;
        config.off_the_record = true;
        Ok(config)
    }
}
