//! Filehub Core - headless library for a local file catalog.
//!
//! Files under a root directory are catalogued in a single JSON registry.
//! Each entry carries an id, display metadata, a delivery hint and
//! allow/deny rules. This crate loads and persists that registry, decides
//! per-requester access, ranks entries by keyword and classifies files for
//! delivery. Sending bytes anywhere is left to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use filehub_core::{FileHub, FileHubConfig, Requester};
//!
//! fn main() -> filehub_core::Result<()> {
//!     let hub = FileHub::new(FileHubConfig::with_root("/srv/filehub"))?;
//!     let who = Requester::new("group-1", "user-42");
//!
//!     for hit in hub.list(&who, "logo") {
//!         println!("{}", filehub_core::format_brief(&hit.entry));
//!     }
//!
//!     let plan = hub.prepare_delivery(&who, "logo")?;
//!     println!("send {} as {:?}", plan.absolute_path.display(), plan.kind);
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod cache;
pub mod config;
pub mod error;
pub mod file_ops;
pub mod models;
pub mod registry;
pub mod search;

mod api;

// Re-export commonly used types
pub use access::{has_access, Requester};
pub use cache::{MediaKind, RecentMedia, RecentMediaCache};
pub use config::{AccessDefaults, FileHubConfig};
pub use error::{FileHubError, Result};
pub use file_ops::{classify_file, normalize_absolute_path, FileClassification};
pub use models::{
    DeliveryKind, DeliveryPlan, Entry, FindOutcome, HubInfo, ImportRequest, IndexMode,
    IndexReport, MetadataUpdate, PermissionUpdate, Permissions, Principals, Registry, SearchHit,
    SendAs, ToolSearchItem, ToolSearchResponse,
};
pub use registry::{generate_unique_id, load_registry, save_registry, RegistryStore};
pub use search::{format_brief, rank};

pub use api::FileHubBuilder;

use std::path::Path;
use std::sync::{Arc, RwLock};

/// Main entry point for catalog operations.
///
/// Holds the configuration, the registry store and the injected recent media
/// cache. Every operation reloads the registry, so several `FileHub`
/// instances (or processes) can share one root.
pub struct FileHub {
    config: Arc<FileHubConfig>,
    store: RegistryStore,
    recent_media: Arc<RecentMediaCache>,
    /// Callback base can be changed at runtime; everything else is fixed
    callback_api_base: RwLock<Option<String>>,
}

impl FileHub {
    /// Create a builder for FileHub.
    pub fn builder(root_dir: impl Into<std::path::PathBuf>) -> FileHubBuilder {
        FileHubBuilder::new(root_dir)
    }

    /// Create a hub from a complete configuration.
    ///
    /// The root directory is created if it does not exist.
    pub fn new(config: FileHubConfig) -> Result<Self> {
        FileHubBuilder::from_config(config).auto_create_dirs(true).build()
    }

    pub fn config(&self) -> &FileHubConfig {
        &self.config
    }

    pub fn root_dir(&self) -> &Path {
        &self.config.root_dir
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn recent_media(&self) -> &RecentMediaCache {
        &self.recent_media
    }
}
