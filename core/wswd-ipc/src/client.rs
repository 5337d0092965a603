//! Connection handling and socket discovery.

use std::env;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::{
    parse_workspaces, read_message, write_message, IpcError, WorkspaceReply, GET_WORKSPACES,
};

pub const I3SOCK_ENV: &str = "I3SOCK";
pub const SWAYSOCK_ENV: &str = "SWAYSOCK";
const IO_TIMEOUT_MS: u64 = 2000;
const SOCKETPATH_COMMANDS: [&str; 2] = ["i3", "sway"];

/// Locates the window manager's IPC socket.
///
/// Checks `$I3SOCK`, then `$SWAYSOCK`, then asks `i3 --get-socketpath` and
/// `sway --get-socketpath`. Empty values are skipped.
pub fn socket_path() -> Result<PathBuf, IpcError> {
    for key in [I3SOCK_ENV, SWAYSOCK_ENV] {
        if let Some(value) = env::var_os(key).filter(|value| !value.is_empty()) {
            return Ok(PathBuf::from(value));
        }
    }

    for program in SOCKETPATH_COMMANDS {
        let output = match Command::new(program).arg("--get-socketpath").output() {
            Ok(output) if output.status.success() => output,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(program, error = %err, "Socket path query failed");
                continue;
            }
        };
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    Err(IpcError::SocketNotFound)
}

/// An open IPC connection.
pub struct Connection {
    stream: UnixStream,
}

impl Connection {
    /// Connects to the socket found by [`socket_path`].
    pub fn connect_default() -> Result<Self, IpcError> {
        Self::connect(&socket_path()?)
    }

    pub fn connect(path: &Path) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path).map_err(|source| IpcError::Connect {
            path: path.display().to_string(),
            source,
        })?;
        let timeout = Some(Duration::from_millis(IO_TIMEOUT_MS));
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        tracing::debug!(path = %path.display(), "Connected to window manager");
        Ok(Connection { stream })
    }

    /// Sends one request and waits for its reply payload.
    pub fn request(&mut self, message_type: u32, payload: &[u8]) -> Result<Vec<u8>, IpcError> {
        write_message(&mut self.stream, message_type, payload)?;
        let (reply_type, reply) = read_message(&mut self.stream)?;
        if reply_type != message_type {
            return Err(IpcError::UnexpectedReply {
                expected: message_type,
                actual: reply_type,
            });
        }
        Ok(reply)
    }

    /// Returns every workspace the window manager currently knows about.
    pub fn get_workspaces(&mut self) -> Result<Vec<WorkspaceReply>, IpcError> {
        let reply = self.request(GET_WORKSPACES, b"")?;
        let workspaces = parse_workspaces(&reply)?;
        tracing::debug!(count = workspaces.len(), "Workspaces received");
        Ok(workspaces)
    }
}
