//! Keyward - encrypted backup and restore of SSH and signing-key material
//!
//! Keyward captures a user's SSH keys, SSH config and exported signing
//! keyring into a passphrase-protected backup directory, and restores them
//! with verified integrity and the right file permissions.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `crypto`: Key derivation and authenticated encryption
//! - `credentials`: Platform secret store access
//! - `integrations`: Keyring export/import and key agent adapters
//! - `storage`: Atomic, permission-aware file writes
//! - `backup`: Backup and restore orchestration
//! - `cli`: Command handlers for the `keyward` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use keyward::config::{paths::KeywardPaths, settings::Settings};
//!
//! let paths = KeywardPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod integrations;
pub mod storage;

pub use error::{KeywardError, KeywardResult};
