//! Error types for wswd-core operations.

use std::fmt;
use std::path::PathBuf;

/// All errors that can occur while managing workspace records.
///
/// A missing record is never an error: the store maps "not found" to
/// `Option::None` (reads) or success (deletes) before it reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum WswdError {
    // ─────────────────────────────────────────────────────────────────────
    // Precondition Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("no workspace is focused")]
    NoFocusedWorkspace,

    #[error("store directory not found: {}", .0.display())]
    StoreMissing(PathBuf),

    #[error("cannot determine cache directory (set WSWD_STORE_DIR)")]
    NoCacheDir,

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", JoinDisplay(.0))]
    Aggregate(Vec<WswdError>),

    // ─────────────────────────────────────────────────────────────────────
    // Dispatch Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("executable file not found in $PATH: {0}")]
    ProgramNotFound(String),

    #[error("cannot enter {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("exec {program}: {source}")]
    ExecFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using WswdError.
pub type Result<T> = std::result::Result<T, WswdError>;

impl WswdError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        WswdError::Io {
            context: context.into(),
            source,
        }
    }

    /// Number of leaf failures, flattening nested aggregates.
    pub fn failure_count(&self) -> usize {
        match self {
            WswdError::Aggregate(errs) => errs.iter().map(WswdError::failure_count).sum(),
            _ => 1,
        }
    }
}

/// Combines independent failures into one error.
///
/// Returns `Ok(())` for an empty list and the sole error unchanged for a
/// single failure, so callers can push every outcome and join at the end.
pub fn join(mut errs: Vec<WswdError>) -> Result<()> {
    match errs.len() {
        0 => Ok(()),
        1 => Err(errs.remove(0)),
        _ => Err(WswdError::Aggregate(errs)),
    }
}

struct JoinDisplay<'a>(&'a [WswdError]);

impl fmt::Display for JoinDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}
