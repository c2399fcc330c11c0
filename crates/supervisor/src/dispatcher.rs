// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message dispatcher: one routing function for every message produced
//! by the core or received from any child.
//!
//! Dispatch runs synchronously under the state lock. The only asynchronous
//! arm is a core-addressed rpc_call, whose handler (and reply re-dispatch)
//! always runs on a spawned task so a caller can never observe its own
//! reply before the dispatching call returns.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use breach_wire::{Envelope, Payload, RpcError, CORE_NAME};

use crate::state::Registration;
use crate::supervisor::Shared;

/// Route one validated message.
///
/// Messages whose source is neither a running module nor `"core"`, and
/// register messages with malformed patterns, are logged and dropped;
/// routing failures never tear down the supervisor.
pub(crate) fn dispatch(shared: &Arc<Shared>, envelope: Envelope) {
    let mut state = shared.state.lock();
    let src = envelope.hdr.src.clone();

    if src != CORE_NAME && !state.running.contains_key(&src) {
        warn!(src = %src, typ = envelope.typ(), "dropping message from unknown source");
        return;
    }

    match &envelope.payload {
        Payload::Register { src_pattern, typ_pattern } => {
            let (source, typ) = match (Regex::new(src_pattern), Regex::new(typ_pattern)) {
                (Ok(source), Ok(typ)) => (source, typ),
                _ => {
                    debug!(src = %src, "dropping register with malformed pattern");
                    return;
                }
            };
            if let Some(module) = state.running.get_mut(&src) {
                module.registrations.push(Registration { id: envelope.hdr.mid, source, typ });
            }
        }

        Payload::Unregister { rid } => {
            if let Some(module) = state.running.get_mut(&src) {
                module.registrations.retain(|r| r.id != *rid);
            }
        }

        Payload::Event { typ, .. } => {
            for (name, module) in state.running.iter() {
                if name == &src {
                    // A module never receives its own events
                    continue;
                }
                for registration in &module.registrations {
                    if registration.source.is_match(&src) && registration.typ.is_match(typ) {
                        if let Some(process) = &module.process {
                            process.send(&envelope);
                        }
                    }
                }
            }
        }

        Payload::RpcCall { dst, prc, arg } => {
            if dst == CORE_NAME {
                let oid = envelope.hdr.mid;
                let mid = state.core.next_mid();
                let reply_to = src;
                let prc = prc.clone();
                let arg = arg.clone();
                let handler = state.core.procedures.get(&prc).cloned();
                let shared = shared.clone();
                tokio::spawn(async move {
                    let result = match handler {
                        Some(handler) => handler(arg).await,
                        None => Err(RpcError::new(
                            "procedure_not_found",
                            format!("no such procedure: {prc}"),
                        )),
                    };
                    let reply = Envelope::rpc_reply(CORE_NAME, mid, reply_to, prc, oid, result);
                    dispatch(&shared, reply);
                });
            } else if let Some(module) = state.running.get(dst.as_str()) {
                if let Some(process) = &module.process {
                    process.send(&envelope);
                }
            } else {
                debug!(dst = %dst, "dropping rpc_call to unknown destination");
            }
        }

        Payload::RpcReply { dst, oid, err, res, .. } => {
            if dst == CORE_NAME {
                match state.core.pending_rpcs.remove(oid) {
                    Some(tx) => {
                        let result = match err {
                            Some(err) => Err(err.clone()),
                            None => Ok(res.clone().unwrap_or(Value::Null)),
                        };
                        let _ = tx.send(result);
                    }
                    None => debug!(oid = *oid, "dropping rpc_reply with unknown correlation id"),
                }
            } else if let Some(module) = state.running.get(dst.as_str()) {
                if let Some(process) = &module.process {
                    process.send(&envelope);
                }
            } else {
                debug!(dst = %dst, "dropping rpc_reply to unknown destination");
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
