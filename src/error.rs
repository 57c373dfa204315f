//! Custom error types for Keyward
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Keyward operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeywardError {
    /// Empty passphrase, missing or malformed argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Authentication tag did not verify (wrong passphrase or corrupted artifact)
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Keyring import failed downstream
    #[error("Keyring import failed: {0}")]
    ImportSink(String),

    /// Key agent rejected a key
    #[error("Key agent error: {0}")]
    Agent(String),

    /// Platform secret store failure
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Cipher construction or encoding errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// A backup run produced no artifacts at all
    #[error("Backup captured nothing: {0}")]
    NothingCaptured(String),
}

impl KeywardError {
    /// Create a "not found" error for stored secrets
    pub fn secret_not_found(service: &str, account: &str) -> Self {
        Self::NotFound {
            entity_type: "Secret",
            identifier: format!("{}/{}", service, account),
        }
    }

    /// Create a "not found" error for backup locations
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an integrity error
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl From<std::io::Error> for KeywardError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeywardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Keyward operations
pub type KeywardResult<T> = Result<T, KeywardError>;
