//! Encrypted backup and restore of trust material
//!
//! # Architecture
//!
//! - `BackupManager`: derives a key, encrypts each source and writes the manifest
//! - `RestoreManager`: derives the same key, verifies and decrypts artifacts,
//!   and restores them with the right permissions
//!
//! # Backup Location Layout
//!
//! - `<id>.encrypted`: one artifact per captured source
//! - `gpg-keys.asc`: encrypted keyring export, when one was captured
//! - `kdf-params.json`: salt and cost parameters for key derivation
//! - `backup-info.json`: `{ "timestamp", "files", "gpg_included" }`
//!
//! # Example
//!
//! ```rust,ignore
//! use keyward::backup::{BackupManager, RestoreManager, SourceFile};
//! use keyward::config::settings::KdfSettings;
//!
//! let sources = vec![SourceFile::in_dir(&ssh_dir, "id_ed25519")?];
//! let report = BackupManager::new(&backup_dir, KdfSettings::default())
//!     .backup("correct-horse".into(), &sources, None)?;
//!
//! let restored = RestoreManager::new(&backup_dir, &ssh_dir)
//!     .restore("correct-horse".into())?;
//! println!("{}", restored.summary());
//! ```

mod manager;
mod manifest;
mod report;
mod restore;
mod source;
mod state;

pub use manager::{load_kdf_params, BackupManager};
pub use manifest::{BackupManifest, MANIFEST_FILE};
pub use report::{AgentOutcome, BackupReport, ItemOutcome, ItemStatus, RestoreReport};
pub use restore::RestoreManager;
pub use source::{artifact_name, MaterialKind, SourceFile};
pub use state::{OperationState, StateTracker};

/// Artifact holding exported keyring material
pub const KEYRING_ARTIFACT: &str = "gpg-keys.asc";

/// Key-derivation parameters recorded for a backup location
pub const KDF_PARAMS_FILE: &str = "kdf-params.json";
