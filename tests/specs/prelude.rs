// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared imports for scenario tests.

pub use breach_supervisor::test_support::{testbed, wait_until, TestBed};
pub use breach_supervisor::{Envelope, Payload, RpcError, CORE_NAME};
pub use serde_json::json;
