//! File I/O utilities with atomic writes and explicit permissions

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::KeywardError;

use super::{PRIVATE_DIR_MODE, PRIVATE_FILE_MODE};

/// Read JSON from a file, returning `None` if the file doesn't exist
pub fn read_json_optional<T, P>(path: P) -> Result<Option<T>, KeywardError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .map_err(|e| KeywardError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map(Some)
        .map_err(|e| KeywardError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The temp file is created with `mode` already applied, and the final file
/// carries exactly `mode` regardless of the process umask.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8], mode: u32) -> Result<(), KeywardError> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path)?;

    let result = write_then_rename(path, &temp_path, bytes, mode);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Write JSON to a file atomically with owner-only permissions
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), KeywardError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = serde_json::to_vec_pretty(data)
        .map_err(|e| KeywardError::Json(format!("Failed to serialize data: {}", e)))?;
    write_atomic(path, &bytes, PRIVATE_FILE_MODE)
}

/// Create a directory (and parents) if missing; a newly created leaf gets 0700
pub fn ensure_private_dir<P: AsRef<Path>>(dir: P) -> Result<(), KeywardError> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| {
        KeywardError::Io(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;
    set_mode(dir, PRIVATE_DIR_MODE)
}

fn write_then_rename(
    path: &Path,
    temp_path: &Path,
    bytes: &[u8],
    mode: u32,
) -> Result<(), KeywardError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options
        .open(temp_path)
        .map_err(|e| KeywardError::Io(format!("Failed to create temp file: {}", e)))?;

    file.write_all(bytes)
        .map_err(|e| KeywardError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    // Sync to disk before rename
    file.sync_all()
        .map_err(|e| KeywardError::Io(format!("Failed to sync {}: {}", path.display(), e)))?;

    set_mode(temp_path, mode)?;

    fs::rename(temp_path, path)
        .map_err(|e| KeywardError::Io(format!("Failed to rename temp file: {}", e)))
}

fn temp_path_for(path: &Path) -> Result<PathBuf, KeywardError> {
    let file_name = path.file_name().ok_or_else(|| {
        KeywardError::InvalidInput(format!("Not a file path: {}", path.display()))
    })?;
    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), KeywardError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| {
        KeywardError::Io(format!("Failed to set permissions on {}: {}", path.display(), e))
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), KeywardError> {
    Ok(())
}
