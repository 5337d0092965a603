//! Storage configuration and path management for wswd.
//!
//! Production code uses [`StorageConfig::from_env`], which honours
//! `WSWD_STORE_DIR` and otherwise points at the user cache directory.
//! Tests use [`StorageConfig::with_root`] to inject a temp directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, WswdError};
use crate::store::RecordStore;

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "WSWD_STORE_DIR";

const STORE_DIR_NAME: &str = "wswd";

/// Central configuration for wswd storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one record file per workspace.
    store_dir: PathBuf,
}

impl StorageConfig {
    /// Resolves the store directory from the environment.
    ///
    /// An empty `WSWD_STORE_DIR` is treated as unset.
    pub fn from_env() -> Result<Self> {
        if let Some(dir) = env::var_os(STORE_DIR_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(dir)));
        }
        let cache = dirs::cache_dir().ok_or(WswdError::NoCacheDir)?;
        Ok(Self::with_root(cache.join(STORE_DIR_NAME)))
    }

    /// Creates a StorageConfig rooted at a custom store directory.
    pub fn with_root(store_dir: PathBuf) -> Self {
        Self { store_dir }
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn record_store(&self) -> RecordStore {
        RecordStore::new(&self.store_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    struct EnvGuard {
        key: &'static str,
        prior: Option<std::ffi::OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prior = env::var_os(key);
            env::set_var(key, value);
            Self { key, prior }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prior {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn env_override_wins() {
        let _lock = env_lock();
        let _guard = EnvGuard::set(STORE_DIR_ENV, "/tmp/wswd-override");
        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.store_dir(), Path::new("/tmp/wswd-override"));
    }

    #[test]
    fn empty_override_falls_back_to_cache_dir() {
        let _lock = env_lock();
        let _guard = EnvGuard::set(STORE_DIR_ENV, "");
        match (StorageConfig::from_env(), dirs::cache_dir()) {
            (Ok(config), Some(cache)) => assert_eq!(config.store_dir(), cache.join("wswd")),
            (Err(WswdError::NoCacheDir), None) => {}
            (other, cache) => panic!("unexpected {:?} with cache dir {:?}", other, cache),
        }
    }

    #[test]
    fn with_root_builds_store_in_that_directory() {
        let config = StorageConfig::with_root(PathBuf::from("/var/empty/wswd"));
        assert_eq!(config.record_store().dir(), Path::new("/var/empty/wswd"));
    }
}
