//! Inputs accepted by the mutating `FileHub` operations.

use super::{Principals, SendAs};
use crate::error::{FileHubError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which files a directory scan picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    #[default]
    All,
    Images,
}

impl FromStr for IndexMode {
    type Err = FileHubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(IndexMode::All),
            "images" | "image" => Ok(IndexMode::Images),
            other => Err(FileHubError::validation(
                "mode",
                format!("unsupported index mode '{}', expected all or images", other),
            )),
        }
    }
}

/// Partial metadata rewrite; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Raw value, validated before any mutation.
    pub send_as: Option<String>,
}

impl MetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.send_as.is_none()
    }

    pub(crate) fn parsed_send_as(&self) -> Result<Option<SendAs>> {
        self.send_as.as_deref().map(str::parse).transpose()
    }
}

/// Replacement permission lists; `None` leaves a side untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionUpdate {
    pub allow: Option<Principals>,
    pub deny: Option<Principals>,
}

/// Metadata for a file copied into the catalog root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Preferred id; generated from the file name when absent.
    pub id: Option<String>,
    /// Display name, also used as the stored file name.
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub send_as: Option<String>,
}

impl ImportRequest {
    pub(crate) fn parsed_send_as(&self) -> Result<Option<SendAs>> {
        self.send_as.as_deref().map(str::parse).transpose()
    }
}
