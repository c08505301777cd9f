//! Registry document persistence.
//!
//! Reads are lock-free snapshots: saves go through an atomic rename, so a
//! reader sees either the old document or the new one. Writers serialize on
//! an in-process mutex plus an advisory lock file next to the document, which
//! also keeps separate processes sharing one root from losing updates.

use super::atomic::{atomic_read_json, atomic_write_json, backup_path};
use crate::config::{FileHubConfig, RegistryConfig};
use crate::error::{FileHubError, Result};
use crate::models::Registry;
use fs2::FileExt;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Return the registry path actually in use.
///
/// The configured path (absolute, or relative to `root_dir`) wins when it
/// exists; otherwise `root_dir/registry.json`. Never touches the disk beyond
/// an existence check.
pub fn resolve_registry_path(root_dir: &Path, registry_file: &str) -> PathBuf {
    let candidate = configured_path(root_dir, registry_file);
    if candidate.exists() {
        return candidate;
    }
    root_dir.join(RegistryConfig::DEFAULT_FILE_NAME)
}

fn configured_path(root_dir: &Path, registry_file: &str) -> PathBuf {
    let configured = Path::new(registry_file);
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root_dir.join(configured)
    }
}

/// Load the registry, substituting an empty one for a missing or corrupt
/// document.
///
/// Always returns the resolved path so callers can report which file was
/// consulted.
pub fn load_registry(root_dir: &Path, registry_file: &str) -> (Registry, PathBuf) {
    let path = resolve_registry_path(root_dir, registry_file);

    let document = match atomic_read_json::<Value>(&path) {
        Ok(Some(document)) => document,
        Ok(None) => {
            debug!("No registry at {}, starting empty", path.display());
            return (Registry::default(), path);
        }
        Err(e) => {
            warn!("Registry {} is unreadable, treating as empty: {}", path.display(), e);
            return (Registry::default(), path);
        }
    };

    match Registry::from_document(document) {
        Some((registry, skipped)) => {
            if skipped > 0 {
                warn!(
                    "Skipped {} malformed entries in {}",
                    skipped,
                    path.display()
                );
            }
            (registry, path)
        }
        None => {
            warn!(
                "Registry {} is not a JSON object, treating as empty",
                path.display()
            );
            (Registry::default(), path)
        }
    }
}

/// Write the full registry document atomically.
pub fn save_registry(
    root_dir: &Path,
    registry_file: &str,
    registry: &Registry,
    keep_backup: bool,
) -> Result<PathBuf> {
    let path = resolve_registry_path(root_dir, registry_file);
    atomic_write_json(&path, registry, keep_backup)?;
    Ok(path)
}

/// Exclusive advisory lock held for one mutation.
struct RegistryLock {
    file: File,
}

impl RegistryLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FileHubError::io_with_path(e, parent))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| FileHubError::io_with_path(e, path))?;
        file.lock_exclusive().map_err(|e| FileHubError::Lock {
            message: format!("Failed to lock {}: {}", path.display(), e),
        })?;
        Ok(Self { file })
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release registry lock: {}", e);
        }
    }
}

/// Owner of one registry document.
pub struct RegistryStore {
    root_dir: PathBuf,
    registry_file: String,
    keep_backup: bool,
    /// Serializes load-modify-save sequences within this process
    write_lock: Mutex<()>,
}

impl RegistryStore {
    pub fn new(root_dir: impl Into<PathBuf>, registry_file: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            registry_file: registry_file.into(),
            keep_backup: true,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &FileHubConfig) -> Self {
        Self::new(&config.root_dir, &config.registry_file).with_backup(config.keep_backup)
    }

    /// Keep a `.bak` copy of the previous document on every save.
    pub fn with_backup(mut self, keep_backup: bool) -> Self {
        self.keep_backup = keep_backup;
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn registry_file(&self) -> &str {
        &self.registry_file
    }

    pub fn resolve_path(&self) -> PathBuf {
        resolve_registry_path(&self.root_dir, &self.registry_file)
    }

    fn lock_path(&self) -> PathBuf {
        let candidate = configured_path(&self.root_dir, &self.registry_file);
        let mut name = candidate.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(RegistryConfig::LOCK_SUFFIX);
        candidate.with_file_name(name)
    }

    /// Whether `path` is the registry document or one of its companions
    /// (backup, lock file, in-flight temp file).
    pub fn is_internal_file(&self, path: &Path) -> bool {
        let document = self.resolve_path();
        if path == document || path == backup_path(&document) || path == self.lock_path() {
            return true;
        }
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(RegistryConfig::TEMP_PREFIX) && n.ends_with(".tmp"))
            .unwrap_or(false)
    }

    /// Snapshot read. Never fails; see [`load_registry`].
    pub fn load(&self) -> (Registry, PathBuf) {
        load_registry(&self.root_dir, &self.registry_file)
    }

    /// Replace the whole document.
    ///
    /// Prefer [`RegistryStore::mutate`] for read-modify-write sequences.
    pub fn save(&self, registry: &Registry) -> Result<PathBuf> {
        let _guard = self.write_lock.lock().map_err(|_| FileHubError::Lock {
            message: "Failed to acquire write lock for registry".to_string(),
        })?;
        let _file_lock = RegistryLock::acquire(&self.lock_path())?;
        save_registry(&self.root_dir, &self.registry_file, registry, self.keep_backup)
    }

    /// Run a load-modify-save sequence as one critical section.
    ///
    /// If `apply` returns an error nothing is written.
    pub fn mutate<T, F>(&self, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Registry) -> Result<T>,
    {
        let _guard = self.write_lock.lock().map_err(|_| FileHubError::Lock {
            message: "Failed to acquire write lock for registry".to_string(),
        })?;
        let _file_lock = RegistryLock::acquire(&self.lock_path())?;

        let (mut registry, _) = self.load();
        let output = apply(&mut registry)?;
        let path = save_registry(&self.root_dir, &self.registry_file, &registry, self.keep_backup)?;
        debug!("Registry updated: {} entries in {}", registry.len(), path.display());
        Ok(output)
    }
}
