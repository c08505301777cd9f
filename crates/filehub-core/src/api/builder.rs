//! Builder for configuring FileHub initialization.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::cache::RecentMediaCache;
use crate::config::{AccessDefaults, FileHubConfig};
use crate::error::{FileHubError, Result};
use crate::file_ops::absolute_path;
use crate::registry::RegistryStore;
use crate::FileHub;
use tracing::info;

/// Builder for configuring FileHub initialization.
///
/// # Example
///
/// ```rust,ignore
/// use filehub_core::FileHub;
///
/// let hub = FileHub::builder("./files")
///     .registry_file("catalog.json")
///     .auto_create_dirs(true)
///     .build()?;
/// ```
pub struct FileHubBuilder {
    config: FileHubConfig,
    auto_create_dirs: bool,
    recent_media: Option<Arc<RecentMediaCache>>,
}

impl FileHubBuilder {
    /// Create a new builder with default configuration rooted at `root_dir`.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(FileHubConfig::with_root(root_dir))
    }

    /// Start from an existing configuration.
    pub fn from_config(config: FileHubConfig) -> Self {
        Self {
            config,
            auto_create_dirs: false,
            recent_media: None,
        }
    }

    /// Registry document, absolute or relative to the root.
    pub fn registry_file(mut self, registry_file: impl Into<String>) -> Self {
        self.config.registry_file = registry_file.into();
        self
    }

    /// Process-level allow/deny lists.
    pub fn access_defaults(mut self, access: AccessDefaults) -> Self {
        self.config.access = access;
        self
    }

    /// Create the root directory if it doesn't exist.
    ///
    /// Default: `false` (the root must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Share a recent media cache with other components.
    ///
    /// Default: a private cache sized from the configuration.
    pub fn with_recent_media(mut self, cache: Arc<RecentMediaCache>) -> Self {
        self.recent_media = Some(cache);
        self
    }

    /// Build the FileHub instance.
    ///
    /// A relative root is resolved against the current directory here, once;
    /// every path the hub stores or compares is derived from that absolute
    /// root.
    pub fn build(mut self) -> Result<FileHub> {
        self.config.root_dir = absolute_path(&self.config.root_dir);
        let root_dir = &self.config.root_dir;
        if !root_dir.exists() {
            if !self.auto_create_dirs {
                return Err(FileHubError::FileNotFound(root_dir.clone()));
            }
            std::fs::create_dir_all(root_dir)
                .map_err(|e| FileHubError::io_with_path(e, root_dir))?;
        }
        if !root_dir.is_dir() {
            return Err(FileHubError::validation(
                "root_dir",
                format!("{} is not a directory", root_dir.display()),
            ));
        }

        let store = RegistryStore::from_config(&self.config);
        let recent_media = self
            .recent_media
            .unwrap_or_else(|| Arc::new(RecentMediaCache::from_config(&self.config.recent_media)));
        let callback_api_base = RwLock::new(self.config.callback_api_base.clone());

        info!(
            "Filehub root={} registry={}",
            self.config.root_dir.display(),
            self.config.registry_file
        );

        Ok(FileHub {
            config: Arc::new(self.config),
            store,
            recent_media,
            callback_api_base,
        })
    }
}
