//! Per-invocation view of the window manager and the store.
//!
//! Built once at startup from a workspace snapshot and passed explicitly to
//! every operation.

use std::path::{Path, PathBuf};

use crate::error::{Result, WswdError};
use crate::reconcile::{self, CleanupReport};
use crate::session;
use crate::storage::StorageConfig;
use crate::store::{RecordStore, StoreEntry};
use crate::types::{EntryState, Workspace, WorkspaceId};

#[derive(Debug, Clone)]
pub struct Context {
    store: RecordStore,
    focused: WorkspaceId,
    live: Vec<WorkspaceId>,
}

impl Context {
    /// Resolves the focused workspace from `workspaces`.
    ///
    /// Fails with [`WswdError::NoFocusedWorkspace`] if none is focused. If the
    /// window manager reports several, the first one wins.
    pub fn new(storage: &StorageConfig, workspaces: &[Workspace]) -> Result<Self> {
        let mut focused = workspaces.iter().filter(|ws| ws.focused);
        let current = focused.next().ok_or(WswdError::NoFocusedWorkspace)?;
        let extra = focused.count();
        if extra > 0 {
            tracing::warn!(
                workspace = %current.id,
                name = %current.name,
                extra,
                "Multiple workspaces report focus; using the first"
            );
        }

        Ok(Context {
            store: storage.record_store(),
            focused: current.id,
            live: workspaces.iter().map(|ws| ws.id).collect(),
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn focused(&self) -> WorkspaceId {
        self.focused
    }

    pub fn live(&self) -> &[WorkspaceId] {
        &self.live
    }

    /// Records `dir` for the focused workspace.
    pub fn set(&self, dir: &Path) -> Result<()> {
        self.store.write(self.focused, dir)
    }

    /// Forgets the focused workspace's directory. No record is not an error.
    pub fn unset(&self) -> Result<()> {
        self.store.remove(self.focused).map(|_| ())
    }

    /// Returns the focused workspace's recorded directory.
    pub fn show(&self) -> Result<Option<PathBuf>> {
        session::resolve(&self.store, self.focused)
    }

    /// Removes everything in the store that does not belong to a live workspace.
    pub fn clean(&self) -> Result<CleanupReport> {
        reconcile::clean(&self.store, &self.live)
    }

    /// Lists store entries with their relation to the live workspace set.
    ///
    /// A store that was never created lists as empty.
    pub fn list(&self) -> Result<Vec<(StoreEntry, EntryState)>> {
        let entries = match self.store.entries() {
            Ok(entries) => entries,
            Err(WswdError::StoreMissing(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(entries
            .into_iter()
            .map(|entry| {
                let state = match entry.workspace {
                    Some(id) if self.live.contains(&id) => EntryState::Live,
                    Some(_) => EntryState::Stale,
                    None => EntryState::Foreign,
                };
                (entry, state)
            })
            .collect())
    }
}
