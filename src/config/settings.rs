//! User settings for Keyward
//!
//! Controls key-derivation cost, which SSH files are captured, and which
//! external collaborators are invoked during backup and restore.

use serde::{Deserialize, Serialize};

use super::paths::KeywardPaths;
use crate::crypto::key_derivation::{KdfAlgorithm, KdfParams, DEFAULT_ITERATIONS};
use crate::error::KeywardError;

/// How the key-derivation salt is chosen for a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SaltPolicy {
    /// Fresh random salt per backup, recorded in the backup directory
    #[default]
    PerBackup,
    /// The legacy constant salt shared by every installation
    Fixed,
}

/// Key derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfSettings {
    #[serde(default)]
    pub algorithm: KdfAlgorithm,
    /// PBKDF2 iterations, or Argon2 time cost
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Argon2 memory cost in KiB
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    #[serde(default)]
    pub salt_policy: SaltPolicy,
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_memory_cost() -> u32 {
    65536
}

fn default_parallelism() -> u32 {
    4
}

impl Default for KdfSettings {
    fn default() -> Self {
        Self {
            algorithm: KdfAlgorithm::default(),
            iterations: default_iterations(),
            memory_cost: default_memory_cost(),
            parallelism: default_parallelism(),
            salt_policy: SaltPolicy::default(),
        }
    }
}

impl KdfSettings {
    /// Parameters for a new backup run
    pub fn params_for_backup(&self) -> KdfParams {
        let mut params = match self.salt_policy {
            SaltPolicy::PerBackup => KdfParams::generate(self.algorithm, self.iterations),
            SaltPolicy::Fixed => {
                let mut legacy = KdfParams::legacy();
                legacy.algorithm = self.algorithm;
                legacy.iterations = self.iterations;
                legacy
            }
        };
        params.memory_cost = self.memory_cost;
        params.parallelism = self.parallelism;
        params
    }
}

/// User settings for Keyward
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub kdf: KdfSettings,

    /// SSH file names captured by a backup
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Export the signing keyring into the backup
    #[serde(default = "default_true")]
    pub include_keyring: bool,

    /// Hand recovered keyring material to the import sink
    #[serde(default = "default_true")]
    pub import_keyring: bool,

    /// Load recovered private keys into the key agent
    #[serde(default = "default_true")]
    pub load_into_agent: bool,

    /// Stop restoring further items after the first integrity failure
    #[serde(default)]
    pub abort_on_integrity_failure: bool,

    /// Ask ssh-add to remember key passphrases in the platform keychain
    #[serde(default = "default_platform_keychain")]
    pub use_platform_keychain: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_sources() -> Vec<String> {
    vec![
        "id_ed25519".to_string(),
        "id_ed25519.pub".to_string(),
        "config".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_platform_keychain() -> bool {
    cfg!(target_os = "macos")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            kdf: KdfSettings::default(),
            sources: default_sources(),
            include_keyring: true,
            import_keyring: true,
            load_into_agent: true,
            abort_on_integrity_failure: false,
            use_platform_keychain: default_platform_keychain(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &KeywardPaths) -> Result<Self, KeywardError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| KeywardError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| KeywardError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &KeywardPaths) -> Result<(), KeywardError> {
        paths.ensure_config_dir()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| KeywardError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| KeywardError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
