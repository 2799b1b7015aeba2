//! Platform-specific configuration paths

use crate::error::{SessionError, SessionResult};
use std::path::PathBuf;

/// Fixed storage key the auth pair is persisted under across restarts
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

/// Configuration paths for the psicov client
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Base configuration directory
    pub config_dir: PathBuf,
    /// Path to the persisted auth pair (auth-storage.json)
    pub auth_storage_file: PathBuf,
}

impl ConfigPaths {
    /// Get configuration paths for the current platform
    ///
    /// Paths:
    /// - Linux: ~/.config/psicov/
    /// - macOS: ~/Library/Application Support/psicov/
    /// - Windows: %APPDATA%\psicov\
    pub fn new() -> SessionResult<Self> {
        let config_dir = Self::get_config_dir()?;

        Ok(Self {
            auth_storage_file: config_dir.join(format!("{AUTH_STORAGE_KEY}.json")),
            config_dir,
        })
    }

    /// Get the configuration directory, respecting PSICOV_CONFIG_DIR env var
    fn get_config_dir() -> SessionResult<PathBuf> {
        if let Ok(dir) = std::env::var("PSICOV_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let base_dir = dirs::config_dir().ok_or_else(|| {
            SessionError::Config("Could not determine configuration directory".to_string())
        })?;

        Ok(base_dir.join("psicov"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_dir_exists(&self) -> SessionResult<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }
}
