// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry and lifecycle scenarios: add, run, duplicate handling,
//! restart policy.

use super::prelude::*;

#[tokio::test]
async fn add_local_then_run_spawns_and_initializes() {
    let bed = testbed().await;
    let path = bed.local_module_versioned("alpha", "1.2.3");

    let record = bed.supervisor.add(&path).await.unwrap();
    assert_eq!(record.path, path);
    assert_eq!(record.name, "alpha");
    assert_eq!(record.version, "1.2.3");

    bed.supervisor.run_module(&path).await.unwrap();
    assert_eq!(bed.processes.spawn_count("alpha"), 1);

    // The child announces readiness; the supervisor answers with init
    let alpha = bed.processes.module("alpha").unwrap();
    alpha.deliver(&Envelope::event("alpha", 1, "internal:ready", json!(null))).await;

    assert!(wait_until(|| alpha.sent_count() == 1).await);
    let init = &alpha.sent()[0];
    assert_eq!(init.hdr.src, CORE_NAME);
    assert!(matches!(&init.payload, Payload::RpcCall { prc, .. } if prc == "init"));
}

#[tokio::test]
async fn duplicate_adds_are_rejected() {
    let bed = testbed().await;
    let path = bed.local_module("alpha");
    bed.supervisor.add(&path).await.unwrap();

    // Same path again
    let err = bed.supervisor.add(&path).await.unwrap_err();
    assert_eq!(err.code(), Some("module_manager:module_conflict"));

    // Different path, same manifest name
    let other = bed.dir.path().join("mods/other");
    std::fs::create_dir_all(&other).unwrap();
    std::fs::write(other.join("package.json"), r#"{"name": "alpha", "version": "3.0.0"}"#)
        .unwrap();
    let err =
        bed.supervisor.add(&format!("local:{}", other.display())).await.unwrap_err();
    assert_eq!(err.code(), Some("module_manager:module_conflict"));
}

#[tokio::test]
async fn crash_looping_module_is_dropped_after_the_restart_budget() {
    let bed = testbed().await;
    bed.processes.auto_exit("alpha");

    let path = bed.local_module("alpha");
    bed.supervisor.add(&path).await.unwrap();
    bed.supervisor.run_module(&path).await.unwrap();

    assert!(wait_until(|| bed.processes.spawn_count("alpha") == 4).await);
    assert!(wait_until(|| bed.running_names().is_empty()).await);

    let listed = bed.supervisor.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].running, "the record stays but is no longer running");
}
