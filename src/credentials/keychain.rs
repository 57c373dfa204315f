use tracing::{debug, info};

use crate::crypto::SecureString;
use crate::error::{KeywardError, KeywardResult};

use super::CredentialStore;

/// Credential store backed by the platform secret service
/// (macOS Keychain, Windows Credential Manager, Secret Service on Linux)
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainCredentialStore;

impl KeychainCredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(service: &str, account: &str) -> KeywardResult<keyring::Entry> {
        keyring::Entry::new(service, account)
            .map_err(|e| KeywardError::CredentialStore(format!("Keychain entry failed: {}", e)))
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn store(&self, service: &str, account: &str, secret: &str) -> KeywardResult<()> {
        self.delete(service, account)?;

        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| KeywardError::CredentialStore(format!("Keychain write failed: {}", e)))?;

        info!(service, account, "stored secret in keychain");
        Ok(())
    }

    fn retrieve(&self, service: &str, account: &str) -> KeywardResult<SecureString> {
        match Self::entry(service, account)?.get_password() {
            Ok(value) => Ok(SecureString::new(value)),
            Err(keyring::Error::NoEntry) => Err(KeywardError::secret_not_found(service, account)),
            Err(err) => Err(KeywardError::CredentialStore(format!(
                "Keychain read failed: {}",
                err
            ))),
        }
    }

    fn delete(&self, service: &str, account: &str) -> KeywardResult<()> {
        match Self::entry(service, account)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!(service, account, "no existing keychain entry");
                Ok(())
            }
            Err(err) => Err(KeywardError::CredentialStore(format!(
                "Keychain delete failed: {}",
                err
            ))),
        }
    }
}
