//! Minimal i3/sway IPC client.
//!
//! Only the workspace query is implemented; wswd needs nothing else from the
//! window manager.
//!
//! # Wire Format
//!
//! ```text
//! "i3-ipc" | payload length (u32, native endian) | message type (u32, native endian) | payload
//! ```
//!
//! Replies carry the same header, with the type echoing the request.

use std::io::{self, Read, Write};

use serde::Deserialize;

mod client;

pub use client::{socket_path, Connection, I3SOCK_ENV, SWAYSOCK_ENV};

pub const MAGIC: &[u8; 6] = b"i3-ipc";
pub const HEADER_LEN: usize = MAGIC.len() + 8;
pub const MAX_REPLY_BYTES: usize = 16 * 1024 * 1024; // 16MB

/// Message type for `GET_WORKSPACES`.
pub const GET_WORKSPACES: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("window manager socket not found (is i3 or sway running?)")]
    SocketNotFound,

    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("IPC I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid IPC magic: {0:?}")]
    BadMagic(Vec<u8>),

    #[error("unexpected reply type {actual} (expected {expected})")]
    UnexpectedReply { expected: u32, actual: u32 },

    #[error("IPC reply of {0} bytes exceeds limit")]
    ReplyTooLarge(usize),

    #[error("failed to decode IPC reply: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of the `GET_WORKSPACES` reply. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceReply {
    pub id: u64,
    #[serde(default)]
    pub num: i64,
    pub name: String,
    pub focused: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub output: String,
}

/// Frames one message.
pub fn encode_message(message_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(HEADER_LEN + payload.len());
    buffer.extend_from_slice(MAGIC);
    buffer.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    buffer.extend_from_slice(&message_type.to_ne_bytes());
    buffer.extend_from_slice(payload);
    buffer
}

/// Splits a header into `(payload length, message type)`.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(usize, u32), IpcError> {
    if &header[..6] != MAGIC {
        return Err(IpcError::BadMagic(header[..6].to_vec()));
    }
    let length = u32::from_ne_bytes([header[6], header[7], header[8], header[9]]);
    let message_type = u32::from_ne_bytes([header[10], header[11], header[12], header[13]]);
    Ok((length as usize, message_type))
}

pub fn write_message<W: Write>(
    writer: &mut W,
    message_type: u32,
    payload: &[u8],
) -> Result<(), IpcError> {
    writer.write_all(&encode_message(message_type, payload))?;
    writer.flush()?;
    Ok(())
}

/// Reads one framed message, returning its type and payload.
pub fn read_message<R: Read>(reader: &mut R) -> Result<(u32, Vec<u8>), IpcError> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    let (length, message_type) = decode_header(&header)?;
    if length > MAX_REPLY_BYTES {
        return Err(IpcError::ReplyTooLarge(length));
    }
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;
    Ok((message_type, payload))
}

/// Parses a `GET_WORKSPACES` reply payload.
pub fn parse_workspaces(payload: &[u8]) -> Result<Vec<WorkspaceReply>, IpcError> {
    Ok(serde_json::from_slice(payload)?)
}
