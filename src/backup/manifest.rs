//! Backup manifest (`backup-info.json`)
//!
//! Written once at the end of a backup run and only read afterwards, to tell
//! the operator what a backup contains and when it was taken.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KeywardResult;
use crate::storage::{read_json_optional, write_json_atomic};

/// File name of the manifest inside a backup location
pub const MANIFEST_FILE: &str = "backup-info.json";

/// What a single backup run captured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    /// When the backup was taken (UTC, second precision)
    #[serde(with = "iso8601_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Logical identifiers of the captured sources, in capture order
    #[serde(rename = "files")]
    pub included_sources: Vec<String>,
    /// Whether exported keyring material is part of the backup
    #[serde(rename = "gpg_included")]
    pub keyring_included: bool,
}

impl BackupManifest {
    pub fn new(
        timestamp: DateTime<Utc>,
        included_sources: Vec<String>,
        keyring_included: bool,
    ) -> Self {
        Self {
            timestamp,
            included_sources,
            keyring_included,
        }
    }

    /// Load the manifest from a backup location, if one was written
    pub fn load(location: &Path) -> KeywardResult<Option<Self>> {
        read_json_optional(location.join(MANIFEST_FILE))
    }

    pub fn save(&self, location: &Path) -> KeywardResult<()> {
        write_json_atomic(location.join(MANIFEST_FILE), self)
    }

    /// One-line provenance description
    pub fn summary(&self) -> String {
        format!(
            "Backup from {}: {} file(s){}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.included_sources.len(),
            if self.keyring_included { " + keyring" } else { "" }
        )
    }
}

mod iso8601_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
