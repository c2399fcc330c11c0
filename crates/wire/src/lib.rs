// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between the supervisor and module child processes.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod framing;

pub use envelope::{Envelope, EnvelopeError, Header, Payload, RpcError, CORE_NAME};
pub use framing::{decode, encode, read_message, write_message, WireError, MAX_MESSAGE_LEN};
