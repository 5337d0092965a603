//! Workspace snapshot from the window manager.

use wswd_core::{Workspace, WorkspaceId};
use wswd_ipc::{Connection, IpcError, WorkspaceReply};

/// Asks the window manager for every open workspace.
pub fn snapshot() -> Result<Vec<Workspace>, IpcError> {
    let mut connection = Connection::connect_default()?;
    let replies = connection.get_workspaces()?;
    Ok(replies.into_iter().map(to_workspace).collect())
}

fn to_workspace(reply: WorkspaceReply) -> Workspace {
    Workspace {
        id: WorkspaceId(reply.id),
        name: reply.name,
        focused: reply.focused,
    }
}
