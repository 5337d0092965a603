//! Brings the store back in line with the window manager's workspace list.
//!
//! Membership is decided by file name alone: an entry is kept only if its name
//! equals `record_name(w)` for some live workspace `w`. Everything else in the
//! store directory is removed, including files wswd never wrote.
//!
//! If no entry matched a live workspace, the store directory itself is removed
//! afterwards, so a fully idle store leaves nothing behind on disk.
//!
//! The sweep is best-effort: every failed removal is collected and the sweep
//! carries on. A concurrent `set` for a workspace that is not in the snapshot
//! may lose its record; there is no cross-process locking.

use std::collections::HashSet;

use fs_err as fs;

use crate::error::{self, Result, WswdError};
use crate::store::{record_name, remove_entry, RecordStore};
use crate::types::WorkspaceId;

/// Outcome of a reconciliation sweep.
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Entries kept because they belong to a live workspace.
    pub kept: Vec<String>,
    /// Entries removed by this sweep.
    pub removed: Vec<String>,
    /// Whether the store directory itself was removed.
    pub store_removed: bool,
    /// Failures encountered while removing entries or the directory.
    pub errors: Vec<WswdError>,
}

impl CleanupReport {
    /// Folds collected failures into a single error, if there were any.
    pub fn into_result(mut self) -> Result<Self> {
        let errors = std::mem::take(&mut self.errors);
        error::join(errors).map(|()| self)
    }
}

/// Runs the sweep and returns the report with failures still attached.
///
/// Only listing the store can fail outright; a missing store directory is
/// [`WswdError::StoreMissing`].
pub fn reconcile(store: &RecordStore, live: &[WorkspaceId]) -> Result<CleanupReport> {
    let allocated: HashSet<String> = live.iter().copied().map(record_name).collect();
    let entries = store.entries()?;
    let mut report = CleanupReport::default();

    for entry in entries {
        if allocated.contains(&entry.name) {
            report.kept.push(entry.name);
            continue;
        }
        match remove_entry(&entry.path, entry.is_dir) {
            Ok(_) => {
                tracing::debug!(entry = %entry.name, "Removed stale store entry");
                report.removed.push(entry.name);
            }
            Err(e) => {
                tracing::debug!(entry = %entry.name, error = %e, "Failed to remove store entry");
                report.errors.push(WswdError::io("remove stale entry", e));
            }
        }
    }

    if report.kept.is_empty() {
        match fs::remove_dir(store.dir()) {
            Ok(()) => report.store_removed = true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => report.store_removed = true,
            Err(e) => report.errors.push(WswdError::io("remove store directory", e)),
        }
    }

    tracing::info!(
        kept = report.kept.len(),
        removed = report.removed.len(),
        failed = report.errors.len(),
        store_removed = report.store_removed,
        "Store reconciled"
    );
    Ok(report)
}

/// Runs the sweep and reports any failures as one aggregated error.
pub fn clean(store: &RecordStore, live: &[WorkspaceId]) -> Result<CleanupReport> {
    reconcile(store, live)?.into_result()
}
