// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message envelope: one header plus a per-kind payload.
//!
//! Decoding is hand-rolled over `serde_json::Value` because the dispatcher's
//! validation gate is field-level: a message missing `hdr.typ`, `hdr.mid`, or
//! `hdr.src` (or carrying the wrong JSON type) must be rejected as a unit,
//! with the reason, not coerced.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Logical sender/recipient name of the synthetic core endpoint.
pub const CORE_NAME: &str = "core";

/// Common message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Sender's logical name (`"core"` for the synthetic endpoint).
    pub src: String,
    /// Sender-scoped monotonic message id.
    pub mid: u64,
}

/// Error payload of a failed RPC reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub msg: String,
    pub nme: String,
}

impl RpcError {
    pub fn new(nme: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { msg: msg.into(), nme: nme.into() }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.nme, self.msg)
    }
}

/// Per-kind payload of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Register { src_pattern: String, typ_pattern: String },
    Unregister { rid: u64 },
    Event { typ: String, evt: Value },
    RpcCall { dst: String, prc: String, arg: Value },
    RpcReply { dst: String, prc: String, oid: u64, err: Option<RpcError>, res: Option<Value> },
}

/// A complete message as routed by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub hdr: Header,
    pub payload: Payload,
}

/// Envelope validation failures. These are logged and dropped by the
/// dispatcher; they never reach the sender.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("missing or non-object hdr")]
    MissingHeader,

    #[error("hdr.{0} missing or wrong type")]
    BadHeaderField(&'static str),

    #[error("unknown message type {0:?}")]
    UnknownType(String),

    #[error("{typ} message missing field {field:?}")]
    MissingField { typ: &'static str, field: &'static str },
}

impl Envelope {
    pub fn event(src: impl Into<String>, mid: u64, typ: impl Into<String>, evt: Value) -> Self {
        Self {
            hdr: Header { src: src.into(), mid },
            payload: Payload::Event { typ: typ.into(), evt },
        }
    }

    pub fn rpc_call(
        src: impl Into<String>,
        mid: u64,
        dst: impl Into<String>,
        prc: impl Into<String>,
        arg: Value,
    ) -> Self {
        Self {
            hdr: Header { src: src.into(), mid },
            payload: Payload::RpcCall { dst: dst.into(), prc: prc.into(), arg },
        }
    }

    pub fn rpc_reply(
        src: impl Into<String>,
        mid: u64,
        dst: impl Into<String>,
        prc: impl Into<String>,
        oid: u64,
        result: Result<Value, RpcError>,
    ) -> Self {
        let (err, res) = match result {
            Ok(res) => (None, Some(res)),
            Err(err) => (Some(err), None),
        };
        Self {
            hdr: Header { src: src.into(), mid },
            payload: Payload::RpcReply { dst: dst.into(), prc: prc.into(), oid, err, res },
        }
    }

    pub fn register(
        src: impl Into<String>,
        mid: u64,
        src_pattern: impl Into<String>,
        typ_pattern: impl Into<String>,
    ) -> Self {
        Self {
            hdr: Header { src: src.into(), mid },
            payload: Payload::Register {
                src_pattern: src_pattern.into(),
                typ_pattern: typ_pattern.into(),
            },
        }
    }

    pub fn unregister(src: impl Into<String>, mid: u64, rid: u64) -> Self {
        Self { hdr: Header { src: src.into(), mid }, payload: Payload::Unregister { rid } }
    }

    /// Wire name of this message's kind (the `hdr.typ` discriminator).
    pub fn typ(&self) -> &'static str {
        match self.payload {
            Payload::Register { .. } => "register",
            Payload::Unregister { .. } => "unregister",
            Payload::Event { .. } => "event",
            Payload::RpcCall { .. } => "rpc_call",
            Payload::RpcReply { .. } => "rpc_reply",
        }
    }

    /// Serialize to the JSON wire shape.
    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "hdr": { "typ": self.typ(), "src": self.hdr.src, "mid": self.hdr.mid },
        });
        let obj = match value.as_object_mut() {
            Some(obj) => obj,
            None => return value,
        };
        match &self.payload {
            Payload::Register { src_pattern, typ_pattern } => {
                obj.insert("src_pattern".into(), json!(src_pattern));
                obj.insert("typ_pattern".into(), json!(typ_pattern));
            }
            Payload::Unregister { rid } => {
                obj.insert("rid".into(), json!(rid));
            }
            Payload::Event { typ, evt } => {
                obj.insert("typ".into(), json!(typ));
                obj.insert("evt".into(), evt.clone());
            }
            Payload::RpcCall { dst, prc, arg } => {
                obj.insert("dst".into(), json!(dst));
                obj.insert("prc".into(), json!(prc));
                obj.insert("arg".into(), arg.clone());
            }
            Payload::RpcReply { dst, prc, oid, err, res } => {
                obj.insert("dst".into(), json!(dst));
                obj.insert("prc".into(), json!(prc));
                obj.insert("oid".into(), json!(oid));
                if let Some(err) = err {
                    obj.insert("err".into(), json!(err));
                }
                if let Some(res) = res {
                    obj.insert("res".into(), res.clone());
                }
            }
        }
        value
    }

    /// Parse and validate a message from its JSON wire shape.
    pub fn from_value(value: &Value) -> Result<Self, EnvelopeError> {
        if !value.is_object() {
            return Err(EnvelopeError::NotAnObject);
        }
        let hdr = value.get("hdr").and_then(Value::as_object).ok_or(EnvelopeError::MissingHeader)?;
        let typ = hdr
            .get("typ")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::BadHeaderField("typ"))?;
        let src = hdr
            .get("src")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::BadHeaderField("src"))?;
        let mid = hdr
            .get("mid")
            .and_then(Value::as_u64)
            .ok_or(EnvelopeError::BadHeaderField("mid"))?;

        let payload = match typ {
            "register" => Payload::Register {
                src_pattern: required_str(value, "register", "src_pattern")?,
                typ_pattern: required_str(value, "register", "typ_pattern")?,
            },
            "unregister" => Payload::Unregister { rid: required_u64(value, "unregister", "rid")? },
            "event" => Payload::Event {
                typ: required_str(value, "event", "typ")?,
                evt: value.get("evt").cloned().unwrap_or(Value::Null),
            },
            "rpc_call" => Payload::RpcCall {
                dst: required_str(value, "rpc_call", "dst")?,
                prc: required_str(value, "rpc_call", "prc")?,
                arg: value.get("arg").cloned().unwrap_or(Value::Null),
            },
            "rpc_reply" => Payload::RpcReply {
                dst: required_str(value, "rpc_reply", "dst")?,
                prc: required_str(value, "rpc_reply", "prc")?,
                oid: required_u64(value, "rpc_reply", "oid")?,
                err: value
                    .get("err")
                    .filter(|v| !v.is_null())
                    .map(|v| {
                        serde_json::from_value(v.clone()).map_err(|_| {
                            EnvelopeError::MissingField { typ: "rpc_reply", field: "err" }
                        })
                    })
                    .transpose()?,
                res: value.get("res").filter(|v| !v.is_null()).cloned(),
            },
            other => return Err(EnvelopeError::UnknownType(other.to_string())),
        };

        Ok(Envelope { hdr: Header { src: src.to_string(), mid }, payload })
    }
}

fn required_str(
    value: &Value,
    typ: &'static str,
    field: &'static str,
) -> Result<String, EnvelopeError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(EnvelopeError::MissingField { typ, field })
}

fn required_u64(
    value: &Value,
    typ: &'static str,
    field: &'static str,
) -> Result<u64, EnvelopeError> {
    value.get(field).and_then(Value::as_u64).ok_or(EnvelopeError::MissingField { typ, field })
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
