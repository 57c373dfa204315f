//! Credential store abstraction
//!
//! The core depends only on a three-method capability over a platform
//! secret store: store, retrieve and delete of a (service, account) secret.
//!
//! - `MemoryCredentialStore`: in-process map, used in tests
//! - `KeychainCredentialStore`: the OS secret store via the `keyring` crate
//!
//! `store` has overwrite semantics: any existing record for the pair is
//! deleted first, so repeated calls leave exactly one live record.

mod keychain;
mod memory;

pub use keychain::KeychainCredentialStore;
pub use memory::MemoryCredentialStore;

use crate::crypto::SecureString;
use crate::error::KeywardResult;

/// A single (service, account) -> secret mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub service: String,
    pub account: String,
    pub secret: SecureString,
}

/// Idempotent access to a platform secret store
pub trait CredentialStore {
    /// Store a secret, replacing any existing record for the pair
    fn store(&self, service: &str, account: &str, secret: &str) -> KeywardResult<()>;

    /// Retrieve a secret, failing with `NotFound` when absent
    fn retrieve(&self, service: &str, account: &str) -> KeywardResult<SecureString>;

    /// Delete a secret; absent records are not an error
    fn delete(&self, service: &str, account: &str) -> KeywardResult<()>;
}
