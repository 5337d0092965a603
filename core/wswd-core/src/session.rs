//! Resolves the directory a new process in a workspace should start in.

use std::io;
use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::{Result, WswdError};
use crate::store::RecordStore;
use crate::types::WorkspaceId;

/// Looks up the recorded directory for `focused`.
///
/// `None` means the caller stays where it is.
pub fn resolve(store: &RecordStore, focused: WorkspaceId) -> Result<Option<PathBuf>> {
    let dir = store.read(focused)?;
    match &dir {
        Some(path) => tracing::debug!(workspace = %focused, path = %path.display(), "Session resolved"),
        None => tracing::debug!(workspace = %focused, "No session recorded"),
    }
    Ok(dir)
}

/// Checks that a recorded directory can still be entered.
///
/// A directory that was removed since it was recorded is an error rather than
/// a silent fallback to the current directory.
pub fn check_enterable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|source| WswdError::DirectoryUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(WswdError::DirectoryUnavailable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, "not a directory"),
        });
    }
    Ok(())
}
