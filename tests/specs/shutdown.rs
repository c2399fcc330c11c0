// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graceful shutdown scenarios, including the force-kill deadline.

use super::prelude::*;
use std::time::{Duration, Instant};

#[tokio::test]
async fn unresponsive_module_is_force_killed_at_the_deadline() {
    let bed = testbed().await;
    let (path, alpha) = bed.add_and_run("alpha").await;

    let started = Instant::now();
    // The module never answers its kill RPC; the test deadline is 100ms
    tokio::time::timeout(Duration::from_secs(2), bed.supervisor.kill_module(&path))
        .await
        .expect("kill_module must not hang")
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(100), "force-kill waits out the deadline");
    assert!(alpha.was_terminated());
    assert!(bed.running_names().is_empty());
    assert!(bed.shutdown_names().is_empty());
}

#[tokio::test]
async fn cooperative_module_shuts_down_before_the_deadline() {
    let bed = testbed().await;
    let (path, alpha) = bed.add_and_run("alpha").await;

    let supervisor = bed.supervisor.clone();
    let kill = tokio::spawn(async move { supervisor.kill_module(&path).await });

    assert!(wait_until(|| alpha.sent_count() == 1).await);
    assert!(matches!(&alpha.sent()[0].payload, Payload::RpcCall { prc, .. } if prc == "kill"));
    alpha.exit().await;

    tokio::time::timeout(Duration::from_secs(2), kill).await.unwrap().unwrap().unwrap();
    assert!(!alpha.was_terminated());
    assert!(bed.shutdown_names().is_empty());
}

#[tokio::test]
async fn supervisor_kill_drains_all_running_modules() {
    let bed = testbed().await;
    let (_, alpha) = bed.add_and_run("alpha").await;
    let (_, beta) = bed.add_and_run("beta").await;
    let gamma = bed.local_module("gamma");
    bed.supervisor.add(&gamma).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), bed.supervisor.kill()).await.unwrap();

    assert!(alpha.was_terminated() && beta.was_terminated());
    assert!(bed.running_names().is_empty());
    assert!(bed.shutdown_names().is_empty());
    // Never-run modules are untouched
    assert_eq!(bed.processes.spawn_count("gamma"), 0);
}
