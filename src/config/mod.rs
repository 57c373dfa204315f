//! Configuration module for Keyward
//!
//! This module provides configuration management including:
//! - Path resolution for config, SSH material and backups
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::KeywardPaths;
pub use settings::Settings;
