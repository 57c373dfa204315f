//! Backup sources and how restored material is classified

use std::path::{Path, PathBuf};

use crate::error::{KeywardError, KeywardResult};
use crate::storage::{PRIVATE_FILE_MODE, PUBLIC_FILE_MODE};

/// Extension appended to a source identifier to name its artifact
pub const ARTIFACT_EXTENSION: &str = "encrypted";

/// What kind of trust material a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    PrivateKey,
    PublicKey,
    Config,
}

impl MaterialKind {
    /// Classify a logical identifier by its file name
    pub fn classify(id: &str) -> Self {
        if id.ends_with(".pub") {
            Self::PublicKey
        } else if id.starts_with("id_") {
            Self::PrivateKey
        } else {
            Self::Config
        }
    }

    /// Permission bits for restored files of this kind
    pub fn file_mode(self) -> u32 {
        match self {
            Self::PublicKey => PUBLIC_FILE_MODE,
            Self::PrivateKey | Self::Config => PRIVATE_FILE_MODE,
        }
    }
}

/// One file to capture in a backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Logical identifier, recorded in the manifest
    pub id: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> KeywardResult<Self> {
        let id = id.into();
        validate_identifier(&id)?;
        Ok(Self {
            id,
            path: path.into(),
        })
    }

    /// Use the path's file name as identifier
    pub fn from_path(path: impl Into<PathBuf>) -> KeywardResult<Self> {
        let path = path.into();
        let id = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                KeywardError::InvalidInput(format!("No usable file name in {}", path.display()))
            })?
            .to_string();
        Self::new(id, path)
    }

    /// A file named `id` inside `dir`
    pub fn in_dir(dir: &Path, id: &str) -> KeywardResult<Self> {
        Self::new(id, dir.join(id))
    }

    pub fn kind(&self) -> MaterialKind {
        MaterialKind::classify(&self.id)
    }

    pub fn artifact_name(&self) -> String {
        artifact_name(&self.id)
    }
}

/// Identifiers become file names on both sides of a backup, so they must be
/// a single plain path component.
pub fn validate_identifier(id: &str) -> KeywardResult<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\')
        || id.contains('\0');

    if invalid {
        return Err(KeywardError::InvalidInput(format!(
            "invalid source identifier: {:?}",
            id
        )));
    }
    Ok(())
}

pub fn artifact_name(id: &str) -> String {
    format!("{}.{}", id, ARTIFACT_EXTENSION)
}

/// Recover the identifier from an artifact file name
pub fn identifier_from_artifact(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(ARTIFACT_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .filter(|id| validate_identifier(id).is_ok())
}

/// Map a manifest entry to a logical identifier
///
/// Older manifests recorded absolute source paths; only the file name matters.
pub fn identifier_from_manifest_entry(entry: &str) -> KeywardResult<String> {
    let id = Path::new(entry)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(entry);
    validate_identifier(id)?;
    Ok(id.to_string())
}
