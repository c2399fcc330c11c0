// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn manifest() -> Manifest {
    Manifest { name: "alpha".into(), version: "1.2.3".into() }
}

#[test]
fn remote_record_denormalizes_owner_repo_tag() {
    let id = Identifier::parse("github:alice/widgets#v1.0.0").unwrap();
    let record = ModuleRecord::new(&id, &manifest());
    assert_eq!(record.path, "github:alice/widgets#v1.0.0");
    assert_eq!(record.owner.as_deref(), Some("alice"));
    assert_eq!(record.repo.as_deref(), Some("widgets"));
    assert_eq!(record.tag.as_deref(), Some("v1.0.0"));
    assert!(record.active);
}

#[test]
fn local_record_has_no_remote_fields() {
    let id = Identifier::parse("local:/tmp/mod").unwrap();
    let record = ModuleRecord::new(&id, &manifest());
    assert_eq!(record.path, "local:/tmp/mod");
    assert_eq!(record.owner, None);
    assert_eq!(record.repo, None);
    assert_eq!(record.tag, None);
}

#[test]
fn record_serde_round_trips() {
    let id = Identifier::parse("github:alice/widgets#v1.0.0").unwrap();
    let record = ModuleRecord::new(&id, &manifest());
    let json = serde_json::to_value(&record).unwrap();
    let back: ModuleRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn local_record_omits_remote_fields_in_json() {
    let id = Identifier::parse("local:/tmp/mod").unwrap();
    let json = serde_json::to_value(ModuleRecord::new(&id, &manifest())).unwrap();
    assert!(json.get("owner").is_none());
    assert!(json.get("tag").is_none());
}
