//! Atomic file operations for safe JSON persistence.
//!
//! Implements atomic writes using:
//! 1. Write to a uniquely named temp file in the target directory
//! 2. fsync to ensure data reaches disk
//! 3. Optional backup of the previous document
//! 4. Atomic rename over the target path

use crate::config::RegistryConfig;
use crate::{FileHubError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if reading or
/// parsing fails.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| FileHubError::Json {
            message: format!("{} is not valid JSON: {}", path.display(), e),
            source: Some(e),
        })
}

/// Path of the backup copy kept for `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(RegistryConfig::BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Write data to a JSON file atomically.
///
/// Readers see either the previous document or the new one, never a partial
/// write. The temp file is removed if anything fails before the rename.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T, keep_backup: bool) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.exists() {
        fs::create_dir_all(&parent).map_err(|e| io_error("create directory", &parent, e))?;
    }

    let serialized = serde_json::to_string_pretty(data).map_err(|e| FileHubError::Json {
        message: format!("Cannot encode document for {}: {}", path.display(), e),
        source: Some(e),
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(RegistryConfig::TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| io_error("create temp file in", &parent, e))?;
    write_synced(&mut temp, serialized.as_bytes())
        .map_err(|e| io_error("write", temp.path(), e))?;

    if keep_backup && path.exists() {
        let backup = backup_path(path);
        match fs::copy(path, &backup) {
            Ok(_) => debug!("Backed up {} to {}", path.display(), backup.display()),
            // Not fatal; the write itself can still succeed
            Err(e) => warn!("Could not back up {}: {}", path.display(), e),
        }
    }

    temp.persist(path).map_err(|e| io_error("replace", path, e.error))?;
    debug!("Wrote {} ({} bytes)", path.display(), serialized.len() + 1);
    Ok(())
}

fn io_error(action: &str, path: &Path, source: io::Error) -> FileHubError {
    FileHubError::Io {
        message: format!("Failed to {}: {}", action, source),
        path: Some(path.to_path_buf()),
        source: Some(source),
    }
}

/// Write the document plus a trailing newline and fsync it.
fn write_synced(temp: &mut NamedTempFile, bytes: &[u8]) -> io::Result<()> {
    temp.write_all(bytes)?;
    temp.write_all(b"\n")?;
    temp.flush()?;
    temp.as_file().sync_all()
}
