//! Passphrase-based key derivation
//!
//! Derives 256-bit keys from operator passphrases. PBKDF2-HMAC-SHA256 is the
//! default; Argon2id is available as a memory-hard alternative. Derivation is
//! deterministic: identical passphrase, salt and cost parameters always yield
//! identical key bytes, which is what makes restore possible.

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use argon2::{Argon2, Params};
use base64::{engine::general_purpose::STANDARD, Engine};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{KeywardError, KeywardResult};

/// Length of derived keys in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Length of freshly generated salts in bytes
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Salt used when no per-backup salt was recorded.
///
/// A single constant salt gives every installation the same key for the same
/// passphrase. Kept so older backups stay restorable.
pub const LEGACY_FIXED_SALT: &[u8] = b"keyward-fixed-salt";

/// Key derivation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KdfAlgorithm {
    #[default]
    Pbkdf2Sha256,
    Argon2id,
}

/// Parameters for key derivation, persisted next to a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    #[serde(default)]
    pub algorithm: KdfAlgorithm,
    /// Salt (base64 encoded)
    pub salt: String,
    /// PBKDF2 iterations, or Argon2 time cost
    pub iterations: u32,
    /// Argon2 memory cost in KiB (ignored for PBKDF2)
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,
    /// Argon2 parallelism (ignored for PBKDF2)
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_cost() -> u32 {
    65536
}

fn default_parallelism() -> u32 {
    4
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::legacy()
    }
}

impl KdfParams {
    /// Create params with a freshly generated random salt
    pub fn generate(algorithm: KdfAlgorithm, iterations: u32) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self {
            algorithm,
            salt: STANDARD.encode(salt),
            iterations,
            memory_cost: default_memory_cost(),
            parallelism: default_parallelism(),
        }
    }

    /// Params for backups that predate recorded salts
    pub fn legacy() -> Self {
        Self::with_salt(KdfAlgorithm::Pbkdf2Sha256, LEGACY_FIXED_SALT, DEFAULT_ITERATIONS)
    }

    /// Create params with a specific salt
    pub fn with_salt(algorithm: KdfAlgorithm, salt: &[u8], iterations: u32) -> Self {
        Self {
            algorithm,
            salt: STANDARD.encode(salt),
            iterations,
            memory_cost: default_memory_cost(),
            parallelism: default_parallelism(),
        }
    }

    /// Decode the salt bytes
    pub fn salt_bytes(&self) -> KeywardResult<Vec<u8>> {
        STANDARD
            .decode(&self.salt)
            .map_err(|e| KeywardError::InvalidInput(format!("Invalid salt encoding: {}", e)))
    }
}

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a key with PBKDF2-HMAC-SHA256
///
/// Fails only on malformed arguments: an empty passphrase, an empty salt, or
/// a zero iteration count.
pub fn derive(passphrase: &str, salt: &[u8], iterations: u32) -> KeywardResult<DerivedKey> {
    validate(passphrase, salt, iterations)?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, iterations, &mut key);
    Ok(DerivedKey { key })
}

/// Derive a key according to persisted parameters
pub fn derive_key(passphrase: &str, params: &KdfParams) -> KeywardResult<DerivedKey> {
    let salt = params.salt_bytes()?;

    match params.algorithm {
        KdfAlgorithm::Pbkdf2Sha256 => derive(passphrase, &salt, params.iterations),
        KdfAlgorithm::Argon2id => derive_argon2id(passphrase, &salt, params),
    }
}

fn derive_argon2id(passphrase: &str, salt: &[u8], params: &KdfParams) -> KeywardResult<DerivedKey> {
    validate(passphrase, salt, params.iterations)?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| KeywardError::InvalidInput(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| KeywardError::InvalidInput(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

fn validate(passphrase: &str, salt: &[u8], iterations: u32) -> KeywardResult<()> {
    if passphrase.is_empty() {
        return Err(KeywardError::InvalidInput(
            "passphrase must not be empty".to_string(),
        ));
    }
    if salt.is_empty() {
        return Err(KeywardError::InvalidInput("salt must not be empty".to_string()));
    }
    if iterations == 0 {
        return Err(KeywardError::InvalidInput(
            "iteration count must be non-zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn test_derive_key_length() {
        let key = derive("test_passphrase", b"salt-bytes", FAST).unwrap();
        assert_eq!(key.as_bytes().len(), KEY_LEN);
    }

    #[test]
    fn test_same_inputs_same_key() {
        let key1 = derive("correct-horse", LEGACY_FIXED_SALT, FAST).unwrap();
        let key2 = derive("correct-horse", LEGACY_FIXED_SALT, FAST).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let key1 = derive("passphrase1", LEGACY_FIXED_SALT, FAST).unwrap();
        let key2 = derive("passphrase2", LEGACY_FIXED_SALT, FAST).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive("same_passphrase", b"salt-one", FAST).unwrap();
        let key2 = derive("same_passphrase", b"salt-two", FAST).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_known_vector() {
        // RFC 7914 section 11 PBKDF2-HMAC-SHA256 vector, first 32 bytes
        let key = derive("passwd", b"salt", 1).unwrap();
        let expected: [u8; 32] = [
            0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f, 0xec, 0x16, 0x91, 0xc2, 0x25, 0x44,
            0xb6, 0x05, 0xf9, 0x41, 0x85, 0x21, 0x6d, 0xde, 0x04, 0x65, 0xe6, 0x8b, 0x9d, 0x57,
            0xc2, 0x0d, 0xac, 0xbc,
        ];
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let err = derive("", LEGACY_FIXED_SALT, FAST).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_empty_salt_and_zero_iterations_rejected() {
        assert!(derive("pw", b"", FAST).unwrap_err().is_invalid_input());
        assert!(derive("pw", b"salt", 0).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_generated_params_have_distinct_salts() {
        let p1 = KdfParams::generate(KdfAlgorithm::Pbkdf2Sha256, FAST);
        let p2 = KdfParams::generate(KdfAlgorithm::Pbkdf2Sha256, FAST);
        assert_ne!(p1.salt, p2.salt);
        assert_eq!(p1.salt_bytes().unwrap().len(), SALT_LEN);

        let key1 = derive_key("same", &p1).unwrap();
        let key2 = derive_key("same", &p2).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_legacy_params_match_direct_derive() {
        let mut params = KdfParams::legacy();
        params.iterations = FAST;
        let via_params = derive_key("correct-horse", &params).unwrap();
        let direct = derive("correct-horse", LEGACY_FIXED_SALT, FAST).unwrap();
        assert_eq!(via_params.as_bytes(), direct.as_bytes());
    }

    #[test]
    fn test_argon2id_deterministic() {
        let mut params = KdfParams::with_salt(KdfAlgorithm::Argon2id, b"0123456789abcdef", 1);
        params.memory_cost = 1024;
        params.parallelism = 1;
        let key1 = derive_key("test_passphrase", &params).unwrap();
        let key2 = derive_key("test_passphrase", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());

        let pbkdf = derive("test_passphrase", b"0123456789abcdef", 1).unwrap();
        assert_ne!(key1.as_bytes(), pbkdf.as_bytes());
    }

    #[test]
    fn test_params_serde() {
        let params = KdfParams::generate(KdfAlgorithm::Argon2id, 3);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"argon2id\""));
        let back: KdfParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
