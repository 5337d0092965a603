//! Core types shared across wswd modules.

use std::fmt;

/// Identifier the window manager assigns to a workspace.
///
/// Opaque to wswd: it is only compared for equality and hex-encoded into
/// record file names. The window manager may reuse an id after a workspace
/// is destroyed and recreated; the new workspace inherits the old record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceId(pub u64);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<u64> for WorkspaceId {
    fn from(id: u64) -> Self {
        WorkspaceId(id)
    }
}

/// One workspace as reported by the window manager at invocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub focused: bool,
}

/// How a store entry relates to the live workspace set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Record for a workspace that currently exists.
    Live,
    /// Record for a workspace the window manager no longer reports.
    Stale,
    /// Name does not follow the `id-<hex>` scheme.
    Foreign,
}

impl EntryState {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryState::Live => "live",
            EntryState::Stale => "stale",
            EntryState::Foreign => "foreign",
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
