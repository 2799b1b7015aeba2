//! Advisory persistence of the auth pair
//!
//! The cached pair is read once at store construction so the UI does not
//! flash a signed-out state before the first provider round-trip settles.
//! It is advisory only: always re-validated against the provider, never
//! trusted as authoritative.

use crate::config::ConfigPaths;
use crate::error::SessionResult;
use crate::models::{AuthSession, Identity};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// The locally persisted auth pair.
///
/// Identity and session are stored together, so a cache entry can never
/// describe one without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAuth {
    pub identity: Identity,
    pub session: AuthSession,
}

/// Storage backend for the advisory auth cache.
pub trait SessionCache: Send + Sync {
    /// Load the cached pair, if present and readable.
    fn load(&self) -> SessionResult<Option<CachedAuth>>;

    /// Persist the pair, replacing any previous entry.
    fn store(&self, cached: &CachedAuth) -> SessionResult<()>;

    /// Remove the cached pair.
    fn delete(&self) -> SessionResult<()>;

    /// Check whether a cached pair exists.
    fn exists(&self) -> bool;
}

/// File-backed cache under the fixed `auth-storage` key.
pub struct FileSessionCache {
    path: PathBuf,
}

impl FileSessionCache {
    /// Create a cache at the platform auth-storage location.
    pub fn new(paths: &ConfigPaths) -> SessionResult<Self> {
        paths.ensure_dir_exists()?;

        Ok(Self {
            path: paths.auth_storage_file.clone(),
        })
    }

    /// Create a cache at an explicit path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionCache for FileSessionCache {
    fn load(&self) -> SessionResult<Option<CachedAuth>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read auth cache, clearing it"
                );
                let _ = fs::remove_file(&self.path);
                return Ok(None);
            }
        };

        match serde_json::from_str::<CachedAuth>(&contents) {
            Ok(cached) => Ok(Some(cached)),
            Err(err) => {
                // Corrupted entry: drop it rather than fail the boot path.
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "auth cache is corrupted, clearing it"
                );
                let _ = fs::remove_file(&self.path);
                Ok(None)
            }
        }
    }

    fn store(&self, cached: &CachedAuth) -> SessionResult<()> {
        let contents = serde_json::to_string_pretty(cached)?;
        fs::write(&self.path, contents)?;

        // Token material on disk stays owner-only (Unix)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn delete(&self) -> SessionResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

/// In-memory cache backend for tests and ephemeral contexts.
#[derive(Default)]
pub struct MemorySessionCache {
    entry: Mutex<Option<CachedAuth>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the cache with a pair.
    pub fn seeded(cached: CachedAuth) -> Self {
        Self {
            entry: Mutex::new(Some(cached)),
        }
    }
}

impl SessionCache for MemorySessionCache {
    fn load(&self) -> SessionResult<Option<CachedAuth>> {
        let entry = self
            .entry
            .lock()
            .map_err(|_| io::Error::other("cache lock poisoned"))?;
        Ok(entry.clone())
    }

    fn store(&self, cached: &CachedAuth) -> SessionResult<()> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| io::Error::other("cache lock poisoned"))?;
        *entry = Some(cached.clone());
        Ok(())
    }

    fn delete(&self) -> SessionResult<()> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| io::Error::other("cache lock poisoned"))?;
        *entry = None;
        Ok(())
    }

    fn exists(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}
