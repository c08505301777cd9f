//! Centralized configuration for the file catalog.
//!
//! `FileHubConfig` is built once (from defaults or a JSON file) and shared by
//! reference with the registry store and access checks. The unit structs hold
//! fixed constants in the same spirit.

use crate::error::{FileHubError, Result};
use crate::models::{lenient, Principals};
use crate::registry::{atomic_read_json, atomic_write_json};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Registry document constants.
pub struct RegistryConfig;

impl RegistryConfig {
    pub const DEFAULT_FILE_NAME: &'static str = "registry.json";
    /// Suffix of the advisory lock file kept next to the document.
    pub const LOCK_SUFFIX: &'static str = "lock";
    pub const BACKUP_SUFFIX: &'static str = "bak";
    pub const TEMP_PREFIX: &'static str = ".registry-";
}

/// File inspection constants.
pub struct InspectConfig;

impl InspectConfig {
    pub const IMAGE_HEADER_LEN: usize = 12;
    pub const MAGIC_HEADER_LEN: usize = 16;
    pub const BYTES_PER_MB: f64 = 1_048_576.0;
}

/// Default result caps.
pub struct ListingConfig;

impl ListingConfig {
    pub const LIST_LIMIT: usize = 20;
    pub const TOOL_LIMIT: usize = 10;
}

/// Process-level allow/deny lists.
///
/// Deny lists always apply. Allow lists only apply to entries that declare no
/// allow restriction of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessDefaults {
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub allow: Principals,
    #[serde(deserialize_with = "lenient::object_or_default")]
    pub deny: Principals,
}

/// Bounds for the per-conversation recent media cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentMediaConfig {
    /// Items kept per conversation, oldest evicted first.
    pub capacity: usize,
    /// Age after which an item is dropped.
    pub ttl_secs: u64,
}

impl RecentMediaConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for RecentMediaConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            ttl_secs: 3600,
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHubConfig {
    /// Base directory for relative catalog paths.
    pub root_dir: PathBuf,
    /// Registry document, absolute or relative to `root_dir`.
    pub registry_file: String,
    /// Base URL of an external callback service, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_api_base: Option<String>,
    /// Files above this size are flagged as oversize. `None` or 0 disables.
    #[serde(deserialize_with = "size_threshold")]
    pub max_file_size_mb: Option<u64>,
    pub access: AccessDefaults,
    pub recent_media: RecentMediaConfig,
    pub list_limit: usize,
    pub tool_limit: usize,
    /// Keep a `.bak` copy of the previous registry on every save.
    pub keep_backup: bool,
}

impl Default for FileHubConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            registry_file: RegistryConfig::DEFAULT_FILE_NAME.to_string(),
            callback_api_base: None,
            max_file_size_mb: None,
            access: AccessDefaults::default(),
            recent_media: RecentMediaConfig::default(),
            list_limit: ListingConfig::LIST_LIMIT,
            tool_limit: ListingConfig::TOOL_LIMIT,
            keep_backup: true,
        }
    }
}

impl FileHubConfig {
    /// Defaults rooted at `root_dir`.
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| FileHubError::io_with_path(e, path))?;
        serde_json::from_str(&contents).map_err(|e| FileHubError::Json {
            message: format!("Failed to parse config {}: {}", path.display(), e),
            source: Some(e),
        })
    }

    /// Size threshold in MB, or `None` when disabled.
    pub fn size_threshold_mb(&self) -> Option<u64> {
        self.max_file_size_mb.filter(|mb| *mb > 0)
    }
}

/// Check that a callback base is an http(s) URL.
pub fn validate_callback_base(url: &str) -> Result<String> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(FileHubError::validation(
            "callback_api_base",
            "must start with http:// or https://",
        ))
    }
}

/// Validate `url` and store it as `callback_api_base` in the config file at
/// `path`, keeping every other key. A missing file is created.
pub fn save_callback_base(path: &Path, url: &str) -> Result<String> {
    let url = validate_callback_base(url)?;
    let mut document = atomic_read_json::<serde_json::Value>(path)?
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    let object = document.as_object_mut().ok_or_else(|| {
        FileHubError::validation("config", format!("{} is not a JSON object", path.display()))
    })?;
    object.insert(
        "callback_api_base".to_string(),
        serde_json::Value::String(url.clone()),
    );
    atomic_write_json(path, &document, false)?;
    Ok(url)
}

/// `dirs::data_dir()/filehub`, or `./filehub` when no data dir is known.
pub fn default_root_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("filehub"))
        .unwrap_or_else(|| PathBuf::from("filehub"))
}

// -1, 0 and null all mean "no threshold".
fn size_threshold<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<i64>::deserialize(deserializer)?;
    Ok(value.filter(|mb| *mb > 0).map(|mb| mb as u64))
}
