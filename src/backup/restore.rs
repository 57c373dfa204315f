//! Backup restoration
//!
//! Restore is best-effort per item: every artifact is decrypted and verified
//! before anything is written, an artifact that fails verification is
//! reported and never touches disk, and the remaining artifacts proceed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::crypto::{
    decrypt, derive_key, DerivedKey, EncryptedArtifact, SecureBytes, SecureString,
};
use crate::error::{KeywardError, KeywardResult};
use crate::integrations::{ImportOutcome, KeyAgent, KeyringImportSink};
use crate::storage::{ensure_private_dir, write_atomic};

use super::manager::load_kdf_params;
use super::manifest::BackupManifest;
use super::report::{AgentOutcome, ItemOutcome, ItemStatus, RestoreReport};
use super::source::{
    artifact_name, identifier_from_artifact, identifier_from_manifest_entry, MaterialKind,
};
use super::state::{OperationState, StateTracker};
use super::KEYRING_ARTIFACT;

/// An artifact scheduled for decryption
#[derive(Debug, Clone, PartialEq, Eq)]
enum Planned {
    File(String),
    Keyring,
}

impl Planned {
    fn id(&self) -> &str {
        match self {
            Self::File(id) => id,
            Self::Keyring => KEYRING_ARTIFACT,
        }
    }

    fn artifact_name(&self) -> String {
        match self {
            Self::File(id) => artifact_name(id),
            Self::Keyring => KEYRING_ARTIFACT.to_string(),
        }
    }
}

/// Restores a backup location into a target directory
pub struct RestoreManager<'a> {
    location: PathBuf,
    target_dir: PathBuf,
    abort_on_integrity_failure: bool,
    import_sink: Option<&'a dyn KeyringImportSink>,
    agent: Option<&'a dyn KeyAgent>,
}

impl<'a> RestoreManager<'a> {
    pub fn new(location: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            target_dir: target_dir.into(),
            abort_on_integrity_failure: false,
            import_sink: None,
            agent: None,
        }
    }

    /// Hand recovered keyring material to `sink`
    pub fn with_import_sink(mut self, sink: &'a dyn KeyringImportSink) -> Self {
        self.import_sink = Some(sink);
        self
    }

    /// Load recovered private keys into `agent`
    pub fn with_agent(mut self, agent: &'a dyn KeyAgent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Stop after the first artifact that fails verification
    pub fn abort_on_integrity_failure(mut self, abort: bool) -> Self {
        self.abort_on_integrity_failure = abort;
        self
    }

    /// Read the manifest without restoring anything
    pub fn read_manifest(&self) -> KeywardResult<BackupManifest> {
        self.check_location()?;
        BackupManifest::load(&self.location)?
            .ok_or_else(|| KeywardError::backup_not_found(self.location.display().to_string()))
    }

    /// Restore every artifact in the backup location
    pub fn restore(&self, passphrase: SecureString) -> KeywardResult<RestoreReport> {
        let mut state = StateTracker::new();

        let result = self.run(&mut state, passphrase);
        if result.is_err() {
            state.fail();
        }
        result
    }

    fn run(
        &self,
        state: &mut StateTracker,
        passphrase: SecureString,
    ) -> KeywardResult<RestoreReport> {
        self.check_location()?;
        if passphrase.is_empty() {
            return Err(KeywardError::InvalidInput(
                "passphrase must not be empty".to_string(),
            ));
        }

        info!("Restoring from {}", self.location.display());
        let manifest = match BackupManifest::load(&self.location) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!("Ignoring unreadable manifest: {}", err);
                None
            }
        };
        if let Some(manifest) = &manifest {
            info!("{}", manifest.summary());
        }

        state.advance(OperationState::DerivingKey);
        let params = load_kdf_params(&self.location)?;
        let key = derive_key(&passphrase, &params)?;
        drop(passphrase);

        state.advance(OperationState::Decrypting);
        let mut outcomes = Vec::new();
        let plan = self.plan(manifest.as_ref(), &mut outcomes)?;
        let decrypted = self.decrypt_all(&key, plan, &mut outcomes);
        drop(key);

        state.advance(OperationState::RestoringMaterial);
        let mut agent_outcomes = Vec::new();
        let mut keyring_import = None;

        for (item, plaintext) in decrypted {
            match item {
                Planned::File(id) => {
                    let outcome = self.restore_file(&id, &plaintext);
                    if let ItemStatus::Restored(path) = &outcome.status {
                        if MaterialKind::classify(&id) == MaterialKind::PrivateKey {
                            if let Some(result) = self.load_into_agent(path) {
                                agent_outcomes.push(AgentOutcome {
                                    id: id.clone(),
                                    result,
                                });
                            }
                        }
                    }
                    outcomes.push(outcome);
                }
                Planned::Keyring => {
                    let status = match self.import_keyring(&plaintext) {
                        Some(import) if import.success => {
                            keyring_import = Some(import);
                            ItemStatus::Restored(self.location.join(KEYRING_ARTIFACT))
                        }
                        Some(import) => {
                            let reason = format!("keyring import failed: {}", import.diagnostics);
                            keyring_import = Some(import);
                            ItemStatus::Skipped(reason)
                        }
                        None => ItemStatus::Skipped("no import sink".to_string()),
                    };
                    outcomes.push(ItemOutcome::new(KEYRING_ARTIFACT, status));
                }
            }
        }

        let restored_any = outcomes
            .iter()
            .any(|o| matches!(o.status, ItemStatus::Restored(_)));
        let failed_any = outcomes.iter().any(|o| o.is_failure());
        if failed_any && !restored_any {
            state.fail();
        } else {
            state.advance(OperationState::Complete);
        }

        let report = RestoreReport {
            manifest,
            outcomes,
            keyring_import,
            agent: agent_outcomes,
            state: state.current(),
        };
        info!("{}", report.summary());
        Ok(report)
    }

    fn check_location(&self) -> KeywardResult<()> {
        if !self.location.is_dir() {
            return Err(KeywardError::backup_not_found(
                self.location.display().to_string(),
            ));
        }
        Ok(())
    }

    /// Decide which artifacts to restore: the manifest's list when present,
    /// otherwise whatever artifacts the location holds.
    fn plan(
        &self,
        manifest: Option<&BackupManifest>,
        outcomes: &mut Vec<ItemOutcome>,
    ) -> KeywardResult<Vec<Planned>> {
        let mut plan = Vec::new();

        match manifest {
            Some(manifest) => {
                for entry in &manifest.included_sources {
                    match identifier_from_manifest_entry(entry) {
                        Ok(id) => plan.push(Planned::File(id)),
                        Err(err) => outcomes.push(ItemOutcome::failed(entry, err)),
                    }
                }
                if manifest.keyring_included || self.location.join(KEYRING_ARTIFACT).exists() {
                    plan.push(Planned::Keyring);
                }
            }
            None => {
                let mut ids: Vec<String> = fs::read_dir(&self.location)?
                    .flatten()
                    .filter_map(|entry| {
                        let name = entry.file_name();
                        identifier_from_artifact(name.to_str()?).map(str::to_string)
                    })
                    .collect();
                ids.sort();
                plan.extend(ids.into_iter().map(Planned::File));
                if self.location.join(KEYRING_ARTIFACT).exists() {
                    plan.push(Planned::Keyring);
                }
            }
        }

        Ok(plan)
    }

    fn decrypt_all(
        &self,
        key: &DerivedKey,
        plan: Vec<Planned>,
        outcomes: &mut Vec<ItemOutcome>,
    ) -> Vec<(Planned, SecureBytes)> {
        let mut decrypted = Vec::with_capacity(plan.len());
        let mut aborted = false;

        for item in plan {
            if aborted {
                outcomes.push(ItemOutcome::new(
                    item.id(),
                    ItemStatus::Skipped("restore aborted after integrity failure".to_string()),
                ));
                continue;
            }

            match self.decrypt_artifact(key, &item.artifact_name()) {
                Ok(plaintext) => decrypted.push((item, plaintext)),
                Err(err) => {
                    warn!("Failed to restore {}: {}", item.id(), err);
                    if err.is_integrity() && self.abort_on_integrity_failure {
                        aborted = true;
                    }
                    outcomes.push(ItemOutcome::failed(item.id(), err));
                }
            }
        }

        decrypted
    }

    fn decrypt_artifact(&self, key: &DerivedKey, name: &str) -> KeywardResult<SecureBytes> {
        let path = self.location.join(name);
        if !path.exists() {
            return Err(KeywardError::NotFound {
                entity_type: "Artifact",
                identifier: name.to_string(),
            });
        }

        let bytes = fs::read(&path)
            .map_err(|e| KeywardError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let artifact = EncryptedArtifact::from_bytes(&bytes)?;
        decrypt(key, &artifact)
    }

    fn restore_file(&self, id: &str, plaintext: &SecureBytes) -> ItemOutcome {
        let target = self.target_dir.join(id);
        let mode = MaterialKind::classify(id).file_mode();

        let result = ensure_private_dir(&self.target_dir)
            .and_then(|()| write_atomic(&target, plaintext, mode));

        match result {
            Ok(()) => {
                info!("Restored {}", target.display());
                ItemOutcome::new(id, ItemStatus::Restored(target))
            }
            Err(err) => {
                warn!("Failed to write {}: {}", target.display(), err);
                ItemOutcome::failed(id, err)
            }
        }
    }

    fn load_into_agent(&self, path: &Path) -> Option<Result<(), KeywardError>> {
        let agent = self.agent?;
        let result = agent.add_key(path);
        if let Err(err) = &result {
            warn!("{}", err);
        }
        Some(result)
    }

    fn import_keyring(&self, plaintext: &SecureBytes) -> Option<ImportOutcome> {
        let sink = self.import_sink?;

        let outcome = match plaintext.to_secure_string() {
            Some(armored) => sink.import(&armored),
            None => ImportOutcome::failed("keyring material is not valid UTF-8"),
        };

        if outcome.success {
            info!("Imported keyring material");
        } else {
            warn!("Keyring import failed: {}", outcome.diagnostics);
        }
        Some(outcome)
    }
}
