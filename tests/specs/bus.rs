// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message bus scenarios: event routing and core RPC, driven through the
//! child IPC path end to end.

use super::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn events_reach_subscribers_exactly_once_and_never_the_sender() {
    let bed = testbed().await;
    let (_, a) = bed.add_and_run("a").await;
    let (_, b) = bed.add_and_run("b").await;

    a.deliver(&Envelope::register("a", 1, ".*", "state:.*")).await;
    b.deliver(&Envelope::event("b", 1, "state:change", json!({"x": 1}))).await;

    assert!(wait_until(|| a.sent_count() == 1).await);
    match &a.sent()[0].payload {
        Payload::Event { typ, evt } => {
            assert_eq!(typ, "state:change");
            assert_eq!(evt["x"], 1);
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    // Let any stray duplicates land before re-checking
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(a.sent_count(), 1, "exactly one delivery");
    assert_eq!(b.sent_count(), 0, "the emitter hears nothing");
}

#[tokio::test]
async fn spoofed_sources_are_rewritten_to_the_sending_module() {
    let bed = testbed().await;
    let (_, a) = bed.add_and_run("a").await;
    let (_, b) = bed.add_and_run("b").await;

    b.deliver(&Envelope::register("b", 1, "^a$", ".*")).await;
    // Module a claims to be someone else; the supervisor overwrites hdr.src
    a.deliver(&Envelope::event("impostor", 1, "state:change", json!(null))).await;

    assert!(wait_until(|| b.sent_count() == 1).await);
    assert_eq!(b.sent()[0].hdr.src, "a");
}

#[tokio::test]
async fn malformed_messages_are_dropped_without_fallout() {
    let bed = testbed().await;
    let (_, a) = bed.add_and_run("a").await;
    let (_, b) = bed.add_and_run("b").await;

    a.deliver(&Envelope::register("a", 1, ".*", ".*")).await;
    // No mid; fails the validation gate
    b.deliver_raw(json!({"hdr": {"typ": "event", "src": "b"}, "typ": "state:change"})).await;
    // The bus keeps working afterwards
    b.deliver(&Envelope::event("b", 2, "state:change", json!(null))).await;

    assert!(wait_until(|| a.sent_count() == 1).await);
}

#[tokio::test]
async fn module_calls_a_core_procedure_and_gets_a_correlated_reply() {
    let bed = testbed().await;
    let (_, a) = bed.add_and_run("a").await;

    bed.supervisor.expose("ping", |arg| async move {
        let n = arg["n"].as_u64().unwrap_or(0);
        Ok(json!({"pong": n + 1}))
    });

    a.deliver(&Envelope::rpc_call("a", 7, CORE_NAME, "ping", json!({"n": 41}))).await;

    assert!(wait_until(|| a.sent_count() == 1).await);
    let reply = &a.sent()[0];
    assert_eq!(reply.hdr.src, CORE_NAME);
    match &reply.payload {
        Payload::RpcReply { oid, res, err, .. } => {
            assert_eq!(*oid, 7, "the reply echoes the call's mid");
            assert!(err.is_none());
            assert_eq!(res.as_ref().unwrap()["pong"], 42);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[tokio::test]
async fn core_call_round_trips_through_a_module() {
    let bed = testbed().await;
    let (_, a) = bed.add_and_run("a").await;

    let supervisor = bed.supervisor.clone();
    let call = tokio::spawn(async move { supervisor.call("a", "status", json!(null)).await });

    assert!(wait_until(|| a.sent_count() == 1).await);
    let mid = a.sent()[0].hdr.mid;
    a.deliver(&Envelope::rpc_reply("a", 1, CORE_NAME, "status", mid, Ok(json!({"up": true}))))
        .await;

    let result = call.await.unwrap().unwrap();
    assert_eq!(result["up"], true);
    assert_eq!(bed.pending_rpc_count(), 0);
}
