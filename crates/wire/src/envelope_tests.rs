// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn event_round_trips_through_wire_shape() {
    let env = Envelope::event("alpha", 3, "state:change", json!({"x": 1}));
    let value = env.to_value();
    assert_eq!(value["hdr"]["typ"], "event");
    assert_eq!(value["hdr"]["src"], "alpha");
    assert_eq!(value["hdr"]["mid"], 3);
    assert_eq!(value["typ"], "state:change");
    assert_eq!(value["evt"]["x"], 1);
    assert_eq!(Envelope::from_value(&value).unwrap(), env);
}

#[test]
fn rpc_call_round_trips() {
    let env = Envelope::rpc_call(CORE_NAME, 7, "alpha", "init", json!(null));
    let value = env.to_value();
    assert_eq!(value["hdr"]["typ"], "rpc_call");
    assert_eq!(value["dst"], "alpha");
    assert_eq!(value["prc"], "init");
    assert_eq!(Envelope::from_value(&value).unwrap(), env);
}

#[test]
fn rpc_reply_success_omits_err() {
    let env = Envelope::rpc_reply(CORE_NAME, 9, "alpha", "ping", 7, Ok(json!({"pong": 42})));
    let value = env.to_value();
    assert_eq!(value["oid"], 7);
    assert!(value.get("err").is_none());
    assert_eq!(value["res"]["pong"], 42);
    assert_eq!(Envelope::from_value(&value).unwrap(), env);
}

#[test]
fn rpc_reply_failure_carries_msg_and_nme() {
    let err = RpcError::new("procedure_not_found", "no such procedure: ping");
    let env = Envelope::rpc_reply(CORE_NAME, 9, "alpha", "ping", 7, Err(err.clone()));
    let value = env.to_value();
    assert_eq!(value["err"]["nme"], "procedure_not_found");
    assert_eq!(value["err"]["msg"], "no such procedure: ping");
    assert!(value.get("res").is_none());
    let back = Envelope::from_value(&value).unwrap();
    match back.payload {
        Payload::RpcReply { err: Some(e), res: None, .. } => assert_eq!(e, err),
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn register_and_unregister_round_trip() {
    let reg = Envelope::register("alpha", 1, ".*", "state:.*");
    assert_eq!(Envelope::from_value(&reg.to_value()).unwrap(), reg);
    let unreg = Envelope::unregister("alpha", 2, 1);
    assert_eq!(Envelope::from_value(&unreg.to_value()).unwrap(), unreg);
}

#[test]
fn missing_header_is_rejected() {
    let err = Envelope::from_value(&json!({"typ": "event"})).unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingHeader));
}

#[test]
fn non_numeric_mid_is_rejected() {
    let value = json!({"hdr": {"typ": "event", "src": "alpha", "mid": "7"}, "typ": "x"});
    let err = Envelope::from_value(&value).unwrap_err();
    assert!(matches!(err, EnvelopeError::BadHeaderField("mid")));
}

#[test]
fn missing_src_is_rejected() {
    let value = json!({"hdr": {"typ": "event", "mid": 1}, "typ": "x"});
    let err = Envelope::from_value(&value).unwrap_err();
    assert!(matches!(err, EnvelopeError::BadHeaderField("src")));
}

#[test]
fn unknown_type_is_rejected() {
    let value = json!({"hdr": {"typ": "gossip", "src": "alpha", "mid": 1}});
    let err = Envelope::from_value(&value).unwrap_err();
    assert!(matches!(err, EnvelopeError::UnknownType(t) if t == "gossip"));
}

#[test]
fn register_with_non_string_pattern_is_rejected() {
    let value = json!({
        "hdr": {"typ": "register", "src": "alpha", "mid": 1},
        "src_pattern": 42,
        "typ_pattern": ".*",
    });
    let err = Envelope::from_value(&value).unwrap_err();
    assert!(matches!(err, EnvelopeError::MissingField { field: "src_pattern", .. }));
}

#[test]
fn event_without_evt_defaults_to_null() {
    let value = json!({"hdr": {"typ": "event", "src": "alpha", "mid": 1}, "typ": "tick"});
    let env = Envelope::from_value(&value).unwrap();
    assert_eq!(env.payload, Payload::Event { typ: "tick".into(), evt: serde_json::Value::Null });
}
