//! Cryptographic functions for Keyward
//!
//! Provides AES-256-GCM encryption with PBKDF2 or Argon2id key derivation
//! for the encrypted backup artifacts.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{decrypt, encrypt, EncryptedArtifact};
pub use key_derivation::{derive, derive_key, DerivedKey, KdfAlgorithm, KdfParams};
pub use secure_memory::{SecureBytes, SecureString};
