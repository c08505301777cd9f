//! Indexing and import methods on FileHub.

use crate::cache::MediaKind;
use crate::error::{FileHubError, Result};
use crate::file_ops::{
    absolute_path, detect_extension_by_magic, is_image_by_extension, normalize_absolute_path,
    relative_to_root,
};
use crate::models::{Entry, ImportRequest, IndexMode, IndexReport, SendAs};
use crate::registry::{generate_unique_id, validate_requested_id};
use crate::FileHub;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

impl FileHub {
    // ========================================
    // Directory indexing
    // ========================================

    /// Catalog every file under the root that is not catalogued yet.
    pub fn index_directory(&self, mode: IndexMode, recursive: bool) -> Result<IndexReport> {
        let root_dir = self.config.root_dir.clone();
        let mut walker = WalkDir::new(&root_dir).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let added_ids = self.store.mutate(|registry| {
            let mut known: HashSet<PathBuf> = registry
                .files
                .iter()
                .filter(|e| !e.path.is_empty())
                .map(|e| normalize_absolute_path(&root_dir, &e.path))
                .collect();
            let mut added_ids = Vec::new();

            for dir_entry in walker.into_iter().filter_map(|e| e.ok()) {
                if !dir_entry.file_type().is_file() {
                    continue;
                }
                let abs_path = absolute_path(dir_entry.path());
                if self.store.is_internal_file(&abs_path) || known.contains(&abs_path) {
                    continue;
                }
                let is_image = is_image_by_extension(&abs_path);
                if mode == IndexMode::Images && !is_image {
                    continue;
                }

                let file_name = dir_entry.file_name().to_string_lossy().into_owned();
                let id = generate_unique_id(&registry.files, &file_name);
                let mut entry = Entry::new(id.clone(), relative_to_root(&root_dir, &abs_path));
                entry.name = Some(file_name);
                entry.tags = extension_tag(&abs_path).into_iter().collect();
                entry.send_as = if is_image { SendAs::Image } else { SendAs::File };

                debug!("Indexed {} as id={}", abs_path.display(), id);
                registry.files.push(entry);
                known.insert(abs_path);
                added_ids.push(id);
            }
            Ok(added_ids)
        })?;

        info!(
            "Indexed {} new file(s) under {}",
            added_ids.len(),
            root_dir.display()
        );
        Ok(IndexReport {
            added: added_ids.len(),
            added_ids,
            registry_path: self.store.resolve_path(),
        })
    }

    // ========================================
    // Imports
    // ========================================

    /// Copy a local file into the root and register it.
    pub fn import_file(&self, source: impl AsRef<Path>, request: ImportRequest) -> Result<Entry> {
        self.import_with_default(source.as_ref(), request, None)
    }

    /// Register the `index`-th most recent media item of a conversation.
    pub fn save_recent_media(
        &self,
        conversation: &str,
        index: usize,
        mut request: ImportRequest,
    ) -> Result<Entry> {
        let item = self.recent_media.get(conversation, index).ok_or_else(|| {
            FileHubError::validation(
                "index",
                format!("no recent media #{} in this conversation", index),
            )
        })?;
        if request.name.is_none() {
            request.name = item.name.clone();
        }
        let default_send_as = match item.kind {
            MediaKind::Image => SendAs::Image,
            MediaKind::File => SendAs::File,
        };
        self.import_with_default(&item.path, request, Some(default_send_as))
    }

    fn import_with_default(
        &self,
        source: &Path,
        request: ImportRequest,
        default_send_as: Option<SendAs>,
    ) -> Result<Entry> {
        let send_as = request.parsed_send_as()?;
        if !source.is_file() {
            return Err(FileHubError::FileNotFound(source.to_path_buf()));
        }

        let mut file_name = request
            .name
            .as_deref()
            .and_then(|n| Path::new(n.trim()).file_name())
            .or_else(|| source.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| FileHubError::validation("name", "no usable file name"))?;
        if Path::new(&file_name).extension().is_none() {
            let detected = detect_extension_by_magic(source);
            if !detected.is_empty() {
                debug!("Recovered extension {} for {}", detected, source.display());
                file_name.push_str(&detected);
            }
        }

        let (destination, mut target) = claim_destination(&self.config.root_dir, &file_name)?;
        let copied = File::open(source)
            .map_err(|e| FileHubError::io_with_path(e, source))
            .and_then(|mut reader| {
                io::copy(&mut reader, &mut target)
                    .map_err(|e| FileHubError::io_with_path(e, &destination))
            });
        drop(target);
        if let Err(e) = copied {
            if let Err(cleanup) = std::fs::remove_file(&destination) {
                warn!(
                    "Failed to remove {} after copy error: {}",
                    destination.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        let send_as = send_as.or(default_send_as).unwrap_or_else(|| {
            if is_image_by_extension(&destination) {
                SendAs::Image
            } else {
                SendAs::File
            }
        });
        let relative_path = relative_to_root(&self.config.root_dir, &destination);
        let display_name = request.name.clone().unwrap_or_else(|| file_name.clone());

        let registered = self.store.mutate(|registry| {
            let id = match request.id.as_deref() {
                Some(requested) => validate_requested_id(&registry.files, requested)?,
                None => generate_unique_id(&registry.files, &file_name),
            };
            let mut entry = Entry::new(id, relative_path);
            entry.name = Some(display_name);
            entry.description = request.description;
            entry.tags = request.tags;
            entry.send_as = send_as;
            registry.files.push(entry.clone());
            Ok(entry)
        });

        match registered {
            Ok(entry) => {
                info!("Imported {} as id={}", destination.display(), entry.id);
                Ok(entry)
            }
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_file(&destination) {
                    warn!(
                        "Failed to remove {} after import error: {}",
                        destination.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }
}

/// Lowercased extension without the dot, if any.
fn extension_tag(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

/// Create `root/file_name`, or `root/stem_2.ext`, `root/stem_3.ext`, ... when
/// taken. The file is created with `create_new`, so two importers can never
/// end up with the same destination.
fn claim_destination(root: &Path, file_name: &str) -> Result<(PathBuf, File)> {
    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut candidate = root.join(file_name);
    let mut suffix = 2u64;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                candidate = root.join(format!("{}_{}{}", stem, suffix, extension));
                suffix += 1;
            }
            Err(e) => return Err(FileHubError::io_with_path(e, &candidate)),
        }
    }
}
