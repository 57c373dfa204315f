//! External collaborators of the backup core
//!
//! Keyward never manages signing-key trust or agent lifecycles itself; it
//! only hands material to these capabilities:
//!
//! - [`KeyringSource`]: exports armored keyring material at backup time
//! - [`KeyringImportSink`]: accepts recovered keyring material on restore
//! - [`KeyAgent`]: loads a recovered private key into a running agent
//!
//! `gpg` and `ssh-add` adapters are provided, plus in-memory fakes.

mod gpg;
mod memory;
mod ssh_agent;

use std::path::Path;

pub use gpg::GpgKeyring;
pub use memory::{MemoryKeyAgent, MemoryKeyringSink};
pub use ssh_agent::SshAgent;

use crate::crypto::SecureString;
use crate::error::KeywardResult;

/// Produces exported keyring material for a backup run
pub trait KeyringSource {
    /// Export armored keyring text, or `None` when there is nothing to export
    fn export(&self) -> Option<SecureString>;
}

impl<F> KeyringSource for F
where
    F: Fn() -> Option<String>,
{
    fn export(&self) -> Option<SecureString> {
        self().map(SecureString::from)
    }
}

/// Result of handing keyring material to an import sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub success: bool,
    /// Diagnostic text reported by the sink
    pub diagnostics: String,
}

impl ImportOutcome {
    pub fn ok(diagnostics: impl Into<String>) -> Self {
        Self {
            success: true,
            diagnostics: diagnostics.into(),
        }
    }

    pub fn failed(diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Accepts recovered keyring material (write-once per restore)
pub trait KeyringImportSink {
    fn import(&self, armored: &str) -> ImportOutcome;
}

/// Loads private keys into a running key agent
pub trait KeyAgent {
    fn add_key(&self, private_key: &Path) -> KeywardResult<()>;
}
