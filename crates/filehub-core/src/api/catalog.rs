//! Catalog browsing and editing methods on FileHub.

use crate::access::{filter_accessible, requester_has_access, Requester};
use crate::config::validate_callback_base;
use crate::error::{FileHubError, Result};
use crate::file_ops::{is_image_by_extension, normalize_absolute_path};
use crate::models::{
    Entry, HubInfo, MetadataUpdate, PermissionUpdate, SearchHit, SendAs, ToolSearchItem,
    ToolSearchResponse,
};
use crate::search::rank;
use crate::FileHub;
use tracing::{debug, info, warn};

impl FileHub {
    // ========================================
    // Browsing
    // ========================================

    /// Ranked entries visible to `requester`, capped at `list_limit`.
    ///
    /// A blank query lists everything visible in catalog order.
    pub fn list(&self, requester: &Requester, query: &str) -> Vec<SearchHit> {
        self.ranked(requester, query, self.config.list_limit)
    }

    /// Ranked hits for `requester`, capped at `limit`.
    pub(crate) fn ranked(&self, requester: &Requester, query: &str, limit: usize) -> Vec<SearchHit> {
        let (registry, _) = self.store.load();
        let visible = filter_accessible(&registry.files, requester, &self.config.access);
        rank(visible, query)
            .into_iter()
            .take(limit)
            .map(|(score, entry)| SearchHit {
                score,
                entry: entry.clone(),
            })
            .collect()
    }

    /// Structured search results for tool-calling clients.
    pub fn search_for_tool(&self, requester: &Requester, query: &str) -> ToolSearchResponse {
        debug!("Tool search query={:?}", query);
        let results = self
            .ranked(requester, query, self.config.tool_limit)
            .into_iter()
            .map(|hit| tool_item(hit.entry))
            .collect();
        ToolSearchResponse { results }
    }

    /// Look up one entry on behalf of `requester`.
    pub fn get(&self, requester: &Requester, id: &str) -> Result<Entry> {
        let (registry, _) = self.store.load();
        let entry = registry.find(id).ok_or_else(|| FileHubError::NotFound {
            id: id.to_string(),
        })?;
        if !requester_has_access(entry, requester, &self.config.access) {
            debug!("Access denied for requester {:?}", requester);
            return Err(FileHubError::PermissionDenied { id: id.to_string() });
        }
        Ok(entry.clone())
    }

    /// Root, registry location and size of the catalog.
    pub fn info(&self) -> HubInfo {
        let (registry, registry_path) = self.store.load();
        HubInfo {
            root_dir: self.config.root_dir.clone(),
            registry_exists: registry_path.exists(),
            registry_path,
            entry_count: registry.len(),
            callback_api_base: self.callback_base(),
        }
    }

    // ========================================
    // Editing
    // ========================================

    /// Rewrite the provided metadata fields of one entry.
    pub fn update_metadata(&self, id: &str, update: MetadataUpdate) -> Result<Entry> {
        let send_as = update.parsed_send_as()?;

        let entry = self.store.mutate(|registry| {
            let entry = registry.find_mut(id).ok_or_else(|| FileHubError::NotFound {
                id: id.to_string(),
            })?;
            if let Some(name) = update.name {
                entry.name = Some(name);
            }
            if let Some(description) = update.description {
                entry.description = description;
            }
            if let Some(tags) = update.tags {
                entry.tags = tags;
            }
            if let Some(send_as) = send_as {
                entry.send_as = send_as;
            }
            Ok(entry.clone())
        })?;

        info!("Updated metadata for id={}", id);
        Ok(entry)
    }

    /// Replace the allow and/or deny lists of one entry.
    pub fn update_permissions(&self, id: &str, update: PermissionUpdate) -> Result<Entry> {
        let entry = self.store.mutate(|registry| {
            let entry = registry.find_mut(id).ok_or_else(|| FileHubError::NotFound {
                id: id.to_string(),
            })?;
            if let Some(allow) = update.allow {
                entry.permissions.allow = allow;
            }
            if let Some(deny) = update.deny {
                entry.permissions.deny = deny;
            }
            Ok(entry.clone())
        })?;

        info!("Updated permissions for id={}", id);
        Ok(entry)
    }

    /// Drop an entry, optionally deleting its backing file afterwards.
    ///
    /// The file is only touched once the catalog change is saved. A file
    /// that cannot be deleted is logged and left behind.
    pub fn remove(&self, id: &str, delete_file: bool) -> Result<Entry> {
        let entry = self.store.mutate(|registry| {
            registry.remove(id).ok_or_else(|| FileHubError::NotFound {
                id: id.to_string(),
            })
        })?;

        if delete_file && !entry.path.is_empty() {
            let abs_path = normalize_absolute_path(&self.config.root_dir, &entry.path);
            if abs_path.is_file() {
                match std::fs::remove_file(&abs_path) {
                    Ok(()) => info!("Deleted {}", abs_path.display()),
                    Err(e) => warn!("Failed to delete {}: {}", abs_path.display(), e),
                }
            }
        }

        info!("Removed id={} from catalog", id);
        Ok(entry)
    }

    // ========================================
    // Callback base
    // ========================================

    /// Current callback service base URL.
    pub fn callback_base(&self) -> Option<String> {
        self.callback_api_base
            .read()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    /// Validate and store a new callback base URL.
    ///
    /// Persisting it into host configuration is the caller's job.
    pub fn set_callback_base(&self, url: &str) -> Result<String> {
        let url = validate_callback_base(url)?;
        let mut guard = self.callback_api_base.write().map_err(|_| FileHubError::Lock {
            message: "Failed to acquire callback base lock".to_string(),
        })?;
        *guard = Some(url.clone());
        info!("callback_api_base set to {}", url);
        Ok(url)
    }
}

fn tool_item(entry: Entry) -> ToolSearchItem {
    let is_image = match entry.send_as {
        SendAs::Image => true,
        SendAs::Auto => is_image_by_extension(&entry.path),
        SendAs::File => false,
    };
    ToolSearchItem {
        name: entry.display_name().to_string(),
        id: entry.id,
        description: entry.description,
        tags: entry.tags,
        path: entry.path,
        send_as: entry.send_as,
        is_image,
    }
}
