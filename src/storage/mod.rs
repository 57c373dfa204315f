//! Filesystem layer for backup locations and restored material
//!
//! Every write goes through a temp file and an atomic rename, so a crash or
//! failure never leaves a truncated artifact or partial plaintext behind.

pub mod file_io;

pub use file_io::{ensure_private_dir, read_json_optional, write_atomic, write_json_atomic};

/// Owner read/write only
pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Owner read/write, world readable
pub const PUBLIC_FILE_MODE: u32 = 0o644;

/// Owner-only directory
pub const PRIVATE_DIR_MODE: u32 = 0o700;
