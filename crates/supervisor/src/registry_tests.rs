// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use breach_core::Manifest;
use std::time::Duration;

fn config(dir: &tempfile::TempDir) -> Config {
    Config {
        session_dir: dir.path().to_path_buf(),
        off_the_record: false,
        modules_root: dir.path().join("modules"),
        kill_timeout: Duration::from_secs(5),
    }
}

fn record(path: &str, name: &str) -> ModuleRecord {
    let id = Identifier::parse(path).unwrap();
    ModuleRecord::new(&id, &Manifest { name: name.into(), version: "1.0.0".into() })
}

#[test]
fn insert_then_get_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    registry.insert(record("local:/tmp/mod", "alpha")).unwrap();

    let found = registry.get_by_path("local:/tmp/mod").unwrap();
    assert_eq!(found.name, "alpha");
}

#[test]
fn get_unknown_path_is_module_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    let err = registry.get_by_path("local:/tmp/nope").unwrap_err();
    assert_eq!(err.code(), Some("module_manager:module_unknown"));
}

#[test]
fn identical_path_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    registry.insert(record("local:/tmp/mod", "alpha")).unwrap();

    let id = Identifier::parse("local:/tmp/mod").unwrap();
    let err = registry.check_path_conflicts(&id).unwrap_err();
    assert_eq!(err.code(), Some("module_manager:module_conflict"));
}

#[test]
fn same_remote_repo_conflicts_regardless_of_tag() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    registry.insert(record("github:alice/widgets#v1.0.0", "alpha")).unwrap();

    let id = Identifier::parse("github:alice/widgets#v2.0.0").unwrap();
    let err = registry.check_path_conflicts(&id).unwrap_err();
    assert_eq!(err.code(), Some("module_manager:module_conflict"));

    let other = Identifier::parse("github:bob/widgets#v1.0.0").unwrap();
    registry.check_path_conflicts(&other).unwrap();
}

#[test]
fn duplicate_name_conflicts_across_paths() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    registry.insert(record("local:/tmp/mod", "alpha")).unwrap();

    let err = registry.insert(record("local:/tmp/other", "alpha")).unwrap_err();
    assert_eq!(err.code(), Some("module_manager:module_conflict"));
}

#[test]
fn reinsert_same_path_upserts() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    registry.insert(record("local:/tmp/mod", "alpha")).unwrap();

    let mut updated = record("local:/tmp/mod", "alpha");
    updated.version = "2.0.0".into();
    registry.insert(updated).unwrap();

    let all = registry.all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].version, "2.0.0");
}

#[test]
fn remove_deletes_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Registry::open(&config(&dir)).unwrap();
    registry.insert(record("local:/tmp/mod", "alpha")).unwrap();
    registry.remove("local:/tmp/mod").unwrap();
    assert!(registry.all().unwrap().is_empty());
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let registry = Registry::open(&config(&dir)).unwrap();
        registry.insert(record("local:/tmp/mod", "alpha")).unwrap();
    }
    let registry = Registry::open(&config(&dir)).unwrap();
    assert_eq!(registry.all().unwrap().len(), 1);
}

#[test]
fn off_the_record_registry_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir);
    cfg.off_the_record = true;
    let registry = Registry::open(&cfg).unwrap();
    registry.insert(record("local:/tmp/mod", "alpha")).unwrap();
    assert!(!dir.path().join("modules.db").exists());
}
