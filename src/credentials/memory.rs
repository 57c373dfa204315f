use std::sync::Mutex;

use tracing::debug;

use crate::crypto::SecureString;
use crate::error::{KeywardError, KeywardResult};

use super::{CredentialStore, SecretRecord};

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    records: Mutex<Vec<SecretRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> KeywardResult<std::sync::MutexGuard<'_, Vec<SecretRecord>>> {
        self.records
            .lock()
            .map_err(|_| KeywardError::CredentialStore("store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn store(&self, service: &str, account: &str, secret: &str) -> KeywardResult<()> {
        self.delete(service, account)?;

        self.lock()?.push(SecretRecord {
            service: service.to_string(),
            account: account.to_string(),
            secret: SecureString::new(secret),
        });
        debug!(service, account, "stored secret");
        Ok(())
    }

    fn retrieve(&self, service: &str, account: &str) -> KeywardResult<SecureString> {
        self.lock()?
            .iter()
            .find(|r| r.service == service && r.account == account)
            .map(|r| r.secret.clone())
            .ok_or_else(|| KeywardError::secret_not_found(service, account))
    }

    fn delete(&self, service: &str, account: &str) -> KeywardResult<()> {
        self.lock()?
            .retain(|r| !(r.service == service && r.account == account));
        Ok(())
    }
}
