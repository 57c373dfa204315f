//! Structured per-item results of backup and restore runs

use std::path::PathBuf;

use crate::error::KeywardError;
use crate::integrations::ImportOutcome;

use super::manifest::BackupManifest;
use super::state::OperationState;

/// What happened to one source or artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Encrypted and written to the backup location
    Captured,
    /// Decrypted and written to this path
    Restored(PathBuf),
    /// Not attempted, or handed to a sink that did not take it
    Skipped(String),
    Failed(KeywardError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub id: String,
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn new(id: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }

    pub fn failed(id: impl Into<String>, error: KeywardError) -> Self {
        Self::new(id, ItemStatus::Failed(error))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, ItemStatus::Failed(_))
    }

    pub fn error(&self) -> Option<&KeywardError> {
        match &self.status {
            ItemStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of a backup run
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub location: PathBuf,
    pub manifest: BackupManifest,
    /// One entry per requested source, plus the keyring artifact if exported
    pub outcomes: Vec<ItemOutcome>,
    pub state: OperationState,
}

impl BackupReport {
    pub fn captured_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == ItemStatus::Captured)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn summary(&self) -> String {
        let failed = self.failures().count();
        let mut summary = format!("Captured {} artifact(s)", self.captured_count());
        if failed > 0 {
            summary.push_str(&format!(", {} failed", failed));
        }
        summary
    }
}

/// Result of loading a recovered private key into the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    pub id: String,
    pub result: Result<(), KeywardError>,
}

/// Result of a restore run
#[derive(Debug, Clone)]
pub struct RestoreReport {
    /// Provenance, when the backup carried a readable manifest
    pub manifest: Option<BackupManifest>,
    /// One entry per artifact, keyring artifact included
    pub outcomes: Vec<ItemOutcome>,
    /// Import sink result, when keyring material was recovered and handed off
    pub keyring_import: Option<ImportOutcome>,
    pub agent: Vec<AgentOutcome>,
    pub state: OperationState,
}

impl RestoreReport {
    pub fn restored_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ItemStatus::Restored(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Every artifact was restored
    pub fn all_restored(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.status, ItemStatus::Restored(_)))
    }

    /// Downstream problems that did not invalidate restored files
    pub fn warnings(&self) -> Vec<KeywardError> {
        let mut warnings = Vec::new();
        if let Some(import) = &self.keyring_import {
            if !import.success {
                warnings.push(KeywardError::ImportSink(import.diagnostics.clone()));
            }
        }
        warnings.extend(self.agent.iter().filter_map(|a| a.result.clone().err()));
        warnings
    }

    pub fn summary(&self) -> String {
        let mut summary = format!("Restored {} item(s)", self.restored_count());
        let failed = self.failed_count();
        if failed > 0 {
            summary.push_str(&format!(", {} failed", failed));
        }
        let warnings = self.warnings().len();
        if warnings > 0 {
            summary.push_str(&format!(", {} warning(s)", warnings));
        }
        summary
    }
}
