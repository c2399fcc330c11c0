// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The synthetic core endpoint: the host as a first-class bus participant.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::oneshot;

use breach_wire::{Envelope, RpcError, CORE_NAME};

use crate::dispatcher;
use crate::state::Procedure;
use crate::supervisor::{ModuleSupervisor, Shared};

/// Issue an rpc_call from `"core"` and await the correlated reply.
///
/// The continuation fires exactly once; a reply for an id that has already
/// completed is dropped by the dispatcher.
pub(crate) async fn core_call(
    shared: &Arc<Shared>,
    module: &str,
    prc: &str,
    arg: Value,
) -> Result<Value, RpcError> {
    let (tx, rx) = oneshot::channel();
    let envelope = {
        let mut state = shared.state.lock();
        let mid = state.core.next_mid();
        state.core.pending_rpcs.insert(mid, tx);
        Envelope::rpc_call(CORE_NAME, mid, module, prc, arg)
    };
    dispatcher::dispatch(shared, envelope);
    match rx.await {
        Ok(result) => result,
        Err(_) => Err(RpcError::new("call_cancelled", "supervisor shut down before reply")),
    }
}

/// Publish an event from `"core"`. Fire-and-forget.
pub(crate) fn core_emit(shared: &Arc<Shared>, typ: &str, evt: Value) {
    let envelope = {
        let mut state = shared.state.lock();
        let mid = state.core.next_mid();
        Envelope::event(CORE_NAME, mid, typ, evt)
    };
    dispatcher::dispatch(shared, envelope);
}

impl ModuleSupervisor {
    /// Serve a procedure on the core endpoint. Re-exposing a name replaces
    /// the prior handler.
    pub fn expose<F, Fut>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RpcError>> + Send + 'static,
    {
        let procedure: Procedure = Arc::new(move |arg| Box::pin(handler(arg)));
        self.shared.state.lock().core.procedures.insert(name.into(), procedure);
    }

    /// Call a procedure on a running module from the core endpoint.
    pub async fn call(&self, module: &str, prc: &str, arg: Value) -> Result<Value, RpcError> {
        core_call(&self.shared, module, prc, arg).await
    }

    /// Emit an event from the core endpoint.
    pub fn emit(&self, typ: &str, evt: Value) {
        core_emit(&self.shared, typ, evt);
    }
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod tests;
