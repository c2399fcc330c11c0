// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn seeded(store: &dyn DocumentStore) {
    for doc in [
        json!({"path": "local:/tmp/a", "name": "alpha", "version": "1.0.0"}),
        json!({"path": "github:alice/b#1.0.0", "name": "beta", "version": "1.0.0"}),
    ] {
        store.update(&Query::new().field("path", doc["path"].clone()), doc, UpdateOptions { upsert: true }).unwrap();
    }
}

#[test]
fn empty_query_finds_everything() {
    let store = MemoryStore::new();
    seeded(&store);
    assert_eq!(store.find(&Query::new()).unwrap().len(), 2);
}

#[test]
fn field_query_matches_exactly() {
    let store = MemoryStore::new();
    seeded(&store);
    let found = store.find(&Query::new().field("name", "alpha")).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["path"], "local:/tmp/a");
    assert!(store.find(&Query::new().field("name", "gamma")).unwrap().is_empty());
}

#[test]
fn update_without_upsert_skips_missing() {
    let store = MemoryStore::new();
    let n = store
        .update(&Query::new().field("path", "nope"), json!({"path": "nope"}), UpdateOptions::default())
        .unwrap();
    assert_eq!(n, 0);
    assert!(store.find(&Query::new()).unwrap().is_empty());
}

#[test]
fn upsert_replaces_in_place() {
    let store = MemoryStore::new();
    seeded(&store);
    let n = store
        .update(
            &Query::new().field("path", "local:/tmp/a"),
            json!({"path": "local:/tmp/a", "name": "alpha", "version": "2.0.0"}),
            UpdateOptions { upsert: true },
        )
        .unwrap();
    assert_eq!(n, 1);
    let docs = store.find(&Query::new()).unwrap();
    assert_eq!(docs.len(), 2, "upsert must not duplicate");
    assert_eq!(docs[0]["version"], "2.0.0");
}

#[test]
fn remove_single_vs_multi() {
    let store = MemoryStore::new();
    seeded(&store);
    store
        .update(
            &Query::new().field("path", "x"),
            json!({"path": "x", "version": "1.0.0"}),
            UpdateOptions { upsert: true },
        )
        .unwrap();

    let removed =
        store.remove(&Query::new().field("version", "1.0.0"), RemoveOptions::default()).unwrap();
    assert_eq!(removed, 1, "single remove takes the first match only");

    let removed =
        store.remove(&Query::new().field("version", "1.0.0"), RemoveOptions { multi: true }).unwrap();
    assert_eq!(removed, 2);
    assert!(store.find(&Query::new()).unwrap().is_empty());
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("modules.db");

    {
        let store = FileStore::open(&db).unwrap();
        seeded(&store);
    }

    let store = FileStore::open(&db).unwrap();
    let docs = store.find(&Query::new()).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["name"], "alpha");
}

#[test]
fn file_store_remove_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("modules.db");

    let store = FileStore::open(&db).unwrap();
    seeded(&store);
    store.remove(&Query::new().field("name", "alpha"), RemoveOptions::default()).unwrap();
    drop(store);

    let store = FileStore::open(&db).unwrap();
    let docs = store.find(&Query::new()).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], "beta");
}

#[test]
fn file_store_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("nested/session/modules.db");
    let store = FileStore::open(&db).unwrap();
    seeded(&store);
    assert!(db.exists());
}

#[test]
fn missing_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("modules.db")).unwrap();
    assert!(store.find(&Query::new()).unwrap().is_empty());
}
