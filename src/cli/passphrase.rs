//! Passphrase acquisition for backup and restore commands
//!
//! The passphrase is read from `KEYWARD_PASSPHRASE` or a hidden prompt.
//! It is never accepted on the command line and never written anywhere.

use crate::crypto::SecureString;
use crate::error::{KeywardError, KeywardResult};

/// Environment variable holding the backup passphrase
pub const PASSPHRASE_ENV: &str = "KEYWARD_PASSPHRASE";

/// Prompt for a passphrase (hidden input)
pub fn prompt_passphrase(prompt: &str) -> KeywardResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::from)
        .map_err(|e| KeywardError::InvalidInput(format!("Failed to read passphrase: {}", e)))
}

/// Prompt twice for a new backup passphrase
pub fn prompt_new_passphrase() -> KeywardResult<SecureString> {
    loop {
        let pass1 = prompt_passphrase("Backup passphrase: ")?;

        if pass1.is_empty() {
            println!("Passphrase must not be empty. Please try again.");
            continue;
        }

        let pass2 = prompt_passphrase("Confirm passphrase: ")?;

        if pass1 != pass2 {
            println!("Passphrases do not match. Please try again.");
            continue;
        }

        return Ok(pass1);
    }
}

/// Passphrase from the environment, if set
pub fn env_passphrase() -> Option<SecureString> {
    std::env::var(PASSPHRASE_ENV).ok().map(SecureString::from)
}

/// Use the supplied passphrase, then the environment, or ask for one
pub fn passphrase_or_prompt(
    supplied: Option<SecureString>,
    confirm: bool,
) -> KeywardResult<SecureString> {
    match supplied.or_else(env_passphrase) {
        Some(passphrase) => Ok(passphrase),
        None if confirm => prompt_new_passphrase(),
        None => prompt_passphrase("Backup passphrase: "),
    }
}
