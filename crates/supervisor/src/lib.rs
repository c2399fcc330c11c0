// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! breach-supervisor: per-session module supervisor and message bus.
//!
//! One [`ModuleSupervisor`] per session owns the registry of added modules,
//! spawns each active module as an isolated child process, and routes every
//! message between modules and the synthetic `"core"` endpoint through a
//! single dispatcher.

pub mod config;
pub mod env;
pub mod error;
pub mod host;
pub mod layout;
pub mod process;
pub mod registry;
pub mod resolver;

mod dispatcher;
mod installer;
mod endpoint;
mod lifecycle;
mod state;
mod supervisor;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use breach_core::{Identifier, Manifest, ModuleError, ModuleRecord};
pub use breach_wire::{Envelope, Payload, RpcError, CORE_NAME};
pub use config::Config;
pub use error::SupervisorError;
pub use host::{GithubHost, HostError, RemoteHost};
pub use process::{BusEvent, LocalAdapter, ModuleProcess, ProcessAdapter, SpawnError};
pub use registry::ModuleStatus;
pub use supervisor::ModuleSupervisor;
