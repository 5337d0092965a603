//! # wswd-core
//!
//! Remembers a working directory per tiling-window-manager workspace.
//!
//! ## Design Principles
//!
//! - **Synchronous, one-shot**: every invocation performs one operation and exits.
//! - **One file per workspace**: records live in `<cache>/wswd/id-<hex id>`.
//! - **Atomic replace**: writes go through a temp file and a rename.
//! - **Missing is not failure**: absent records read as `None` and delete as a no-op.
//! - **Best-effort cleanup**: reconciliation collects failures instead of stopping.
//!
//! The window manager is not queried here. Callers build a [`Context`] from a
//! workspace snapshot and pass it to each operation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wswd_core::{Context, StorageConfig};
//!
//! let ctx = Context::new(&StorageConfig::from_env()?, &workspaces)?;
//! ctx.set(&std::env::current_dir()?)?;
//! ```

pub mod context;
pub mod dispatch;
pub mod error;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

pub use context::Context;
pub use dispatch::{find_program, DispatchPlan};
pub use error::{join, Result, WswdError};
pub use reconcile::{clean, reconcile, CleanupReport};
pub use storage::{StorageConfig, STORE_DIR_ENV};
pub use store::{parse_record_name, record_name, RecordStore, StoreEntry};
pub use types::{EntryState, Workspace, WorkspaceId};
