//! Path management for Keyward
//!
//! All environment lookups happen once, in [`KeywardPaths::new`]. Backup and
//! restore receive concrete paths from here and never consult the process
//! environment or working directory themselves.
//!
//! ## Config Directory Resolution Order
//!
//! 1. `KEYWARD_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/keyward` on Linux,
//!    `~/Library/Application Support/keyward` on macOS, `%APPDATA%\keyward` on Windows)

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::KeywardError;

/// Manages all paths used by Keyward
#[derive(Debug, Clone)]
pub struct KeywardPaths {
    config_dir: PathBuf,
    home_dir: PathBuf,
}

impl KeywardPaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, KeywardError> {
        let base = BaseDirs::new()
            .ok_or_else(|| KeywardError::Config("Could not determine home directory".into()))?;

        let config_dir = match std::env::var_os("KEYWARD_CONFIG_DIR") {
            Some(custom) => PathBuf::from(custom),
            None => base.config_dir().join("keyward"),
        };

        Ok(Self {
            config_dir,
            home_dir: base.home_dir().to_path_buf(),
        })
    }

    /// Use one directory as both home and config base (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self {
            config_dir: base_dir.join("config"),
            home_dir: base_dir,
        }
    }

    pub fn with_dirs(config_dir: PathBuf, home_dir: PathBuf) -> Self {
        Self {
            config_dir,
            home_dir,
        }
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn home_dir(&self) -> &PathBuf {
        &self.home_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Default directory holding SSH material (~/.ssh)
    pub fn ssh_dir(&self) -> PathBuf {
        self.home_dir.join(".ssh")
    }

    /// Default backup location (~/.keyward-backup)
    pub fn backup_dir(&self) -> PathBuf {
        self.home_dir.join(".keyward-backup")
    }

    pub fn ensure_config_dir(&self) -> Result<(), KeywardError> {
        std::fs::create_dir_all(&self.config_dir)
            .map_err(|e| KeywardError::Io(format!("Failed to create config directory: {}", e)))
    }
}
