//! Delivery preparation methods on FileHub.

use crate::access::Requester;
use crate::error::{FileHubError, Result};
use crate::file_ops::{
    classify_file, file_size_mb, is_image_by_extension, is_valid_image_file,
    normalize_absolute_path, to_file_uri, FileClassification,
};
use crate::models::{DeliveryKind, DeliveryPlan, Entry, FindOutcome, SendAs};
use crate::FileHub;
use std::path::Path;
use tracing::{debug, warn};

impl FileHub {
    /// Resolve, check and describe one entry for a delivery channel.
    pub fn prepare_delivery(&self, requester: &Requester, id: &str) -> Result<DeliveryPlan> {
        let entry = self.get(requester, id)?;
        self.plan_for(entry)
    }

    /// Search and deliver in one step when the query is unambiguous.
    pub fn find_and_prepare(&self, requester: &Requester, query: &str) -> Result<FindOutcome> {
        let mut hits = self.ranked(requester, query, self.config.tool_limit);
        match hits.len() {
            0 => Ok(FindOutcome::NoMatch),
            1 => {
                let hit = hits.remove(0);
                Ok(FindOutcome::Deliver(self.plan_for(hit.entry)?))
            }
            _ => Ok(FindOutcome::Candidates(hits)),
        }
    }

    /// Classify an arbitrary path, resolved against the root.
    pub fn classify(&self, path: impl AsRef<Path>) -> FileClassification {
        classify_file(normalize_absolute_path(&self.config.root_dir, path))
    }

    fn plan_for(&self, entry: Entry) -> Result<DeliveryPlan> {
        let absolute_path = normalize_absolute_path(&self.config.root_dir, &entry.path);
        if entry.path.is_empty() || !absolute_path.is_file() {
            return Err(FileHubError::FileNotFound(absolute_path));
        }

        let kind = match entry.send_as {
            SendAs::Image => DeliveryKind::Image,
            SendAs::File => DeliveryKind::File,
            SendAs::Auto if is_image_by_extension(&absolute_path) => DeliveryKind::Image,
            SendAs::Auto => DeliveryKind::File,
        };

        if kind == DeliveryKind::Image && !is_valid_image_file(&absolute_path) {
            warn!("Rejected invalid image for id={}: {}", entry.id, absolute_path.display());
            return Err(FileHubError::validation("file", "invalid or corrupt image"));
        }

        let size_mb = file_size_mb(&absolute_path);
        let oversize = self
            .config
            .size_threshold_mb()
            .is_some_and(|limit| size_mb > limit as f64);
        if oversize {
            warn!(
                "id={} is {:.2} MB, above the configured threshold",
                entry.id, size_mb
            );
        }

        debug!("Prepared {:?} delivery for id={}", kind, entry.id);
        Ok(DeliveryPlan {
            name: entry.display_name().to_string(),
            id: entry.id,
            kind,
            file_uri: to_file_uri(&absolute_path),
            absolute_path,
            size_mb,
            oversize,
        })
    }
}
