//! File-backed workspace records.
//!
//! One file per workspace, named `id-<hex>` after the workspace id, holding the
//! raw bytes of the recorded directory (no trailing newline).
//!
//! ```text
//! ~/.cache/wswd/
//! ├── id-5581c1b2e0a0    → /home/me/src/project
//! └── id-5581c1b2f3c0    → /home/me/notes
//! ```
//!
//! # Atomic Writes
//!
//! Records are written to a temp file in the store directory and renamed into
//! place, so a concurrent reader sees either the previous path or the new one,
//! never a prefix of it.
//!
//! # Missing Records
//!
//! "Not found" is absorbed here: [`RecordStore::read`] returns `None` and
//! [`RecordStore::remove`] reports `false`. Every other I/O failure propagates.

use std::ffi::OsString;
use std::fs::{DirBuilder, Permissions};
use std::io::{self, Write};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};

use fs_err as fs;
use tempfile::Builder;

use crate::error::{Result, WswdError};
use crate::types::WorkspaceId;

const RECORD_PREFIX: &str = "id-";
const TEMP_PREFIX: &str = ".wswd-";
const DIR_MODE: u32 = 0o700;
const RECORD_MODE: u32 = 0o600;

/// Returns the file name used for `id`'s record.
pub fn record_name(id: WorkspaceId) -> String {
    format!("{}{:x}", RECORD_PREFIX, id)
}

/// Parses a record file name back into a workspace id.
///
/// Only the canonical form produced by [`record_name`] is accepted, so
/// `id-0ff` or `id-FF` are not records.
pub fn parse_record_name(name: &str) -> Option<WorkspaceId> {
    let hex = name.strip_prefix(RECORD_PREFIX)?;
    let id = WorkspaceId(u64::from_str_radix(hex, 16).ok()?);
    (record_name(id) == name).then_some(id)
}

/// A directory entry found in the store.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// File name, lossily decoded for comparison and display.
    pub name: String,
    pub path: PathBuf,
    /// Workspace the entry is a record for, if its name follows the scheme.
    pub workspace: Option<WorkspaceId>,
    pub is_dir: bool,
}

/// Directory of workspace records.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: &Path) -> Self {
        RecordStore {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    pub fn record_path(&self, id: WorkspaceId) -> PathBuf {
        self.dir.join(record_name(id))
    }

    /// Creates the store directory (and parents) as owner-only if absent.
    pub fn ensure_dir(&self) -> Result<()> {
        DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(&self.dir)
            .map_err(|e| {
                WswdError::io(format!("create store directory {}", self.dir.display()), e)
            })
    }

    /// Replaces (or creates) the record for `id`.
    pub fn write(&self, id: WorkspaceId, dir: &Path) -> Result<()> {
        self.ensure_dir()?;
        let target = self.record_path(id);

        let mut temp_file = Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.dir)
            .map_err(|e| {
                WswdError::io(format!("create temp file in {}", self.dir.display()), e)
            })?;
        temp_file
            .as_file()
            .set_permissions(Permissions::from_mode(RECORD_MODE))
            .map_err(|e| WswdError::io("set temp record permissions", e))?;
        temp_file
            .write_all(dir.as_os_str().as_bytes())
            .map_err(|e| WswdError::io("write temp record", e))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| WswdError::io("sync temp record", e))?;
        temp_file
            .persist(&target)
            .map_err(|e| WswdError::io(format!("replace {}", target.display()), e.error))?;

        tracing::debug!(workspace = %id, path = %dir.display(), "Record written");
        Ok(())
    }

    /// Returns the directory recorded for `id`, or `None` if there is no record.
    pub fn read(&self, id: WorkspaceId) -> Result<Option<PathBuf>> {
        match fs::read(self.record_path(id)) {
            Ok(bytes) => Ok(Some(PathBuf::from(OsString::from_vec(bytes)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(WswdError::io("read record", e)),
        }
    }

    /// Removes the record for `id`. Returns whether a record was removed.
    pub fn remove(&self, id: WorkspaceId) -> Result<bool> {
        let removed = remove_entry(&self.record_path(id), false)
            .map_err(|e| WswdError::io("remove record", e))?;
        tracing::debug!(workspace = %id, removed, "Record removed");
        Ok(removed)
    }

    /// Lists every entry in the store directory, records and foreign names alike.
    ///
    /// A missing store directory is [`WswdError::StoreMissing`].
    pub fn entries(&self) -> Result<Vec<StoreEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(WswdError::StoreMissing(self.dir.clone()))
            }
            Err(e) => return Err(WswdError::io("list store", e)),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| WswdError::io("list store", e))?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            let is_dir = dir_entry
                .file_type()
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);
            entries.push(StoreEntry {
                workspace: parse_record_name(&name),
                path: dir_entry.path(),
                name,
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// Removes a file or empty directory, treating "already gone" as `Ok(false)`.
pub(crate) fn remove_entry(path: &Path, is_dir: bool) -> io::Result<bool> {
    let result = if is_dir {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
