// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing for the module IPC channel.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::envelope::{Envelope, EnvelopeError};

/// Upper bound on a single framed message. Anything larger is a corrupt
/// stream or a misbehaving module.
pub const MAX_MESSAGE_LEN: usize = 8 * 1024 * 1024;

/// Errors from framing and message codec operations.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message of {0} bytes exceeds frame limit")]
    Oversized(usize),

    #[error("invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),
}

/// Encode an envelope to its JSON bytes (no length prefix).
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(&envelope.to_value())?)
}

/// Decode an envelope from JSON bytes, applying the validation gate.
pub fn decode(bytes: &[u8]) -> Result<Envelope, WireError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(Envelope::from_value(&value)?)
}

/// Write one length-prefixed message.
pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_MESSAGE_LEN {
        return Err(WireError::Oversized(payload.len()));
    }
    writer.write_all(&(payload.len() as u32).to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed message. An EOF before the first prefix byte
/// surfaces as `WireError::Io(UnexpectedEof)`, which stream readers treat
/// as end-of-stream.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).await?;
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_MESSAGE_LEN {
        return Err(WireError::Oversized(len));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
