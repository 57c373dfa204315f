//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup core.

pub mod backup;
pub mod passphrase;
pub mod secret;

pub use backup::{
    handle_backup_command, handle_info_command, handle_restore_command, BackupArgs, InfoArgs,
    RestoreArgs,
};
pub use secret::{handle_secret_command, SecretCommands};
