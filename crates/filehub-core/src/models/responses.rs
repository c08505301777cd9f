//! Result types returned by the `FileHub` façade.

use super::{Entry, SendAs};
use serde::Serialize;
use std::path::PathBuf;

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub score: u32,
    pub entry: Entry,
}

/// One item of the structured listing handed to tool-calling clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSearchItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub path: String,
    pub send_as: SendAs,
    pub is_image: bool,
}

/// Structured search response (`{"results": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSearchResponse {
    pub results: Vec<ToolSearchItem>,
}

/// How a file should be handed to a delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    Image,
    File,
}

/// Everything a delivery channel needs to send one catalogued file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryPlan {
    pub id: String,
    pub name: String,
    pub kind: DeliveryKind,
    pub absolute_path: PathBuf,
    pub file_uri: String,
    pub size_mb: f64,
    /// Set when the file exceeds the configured size threshold. Delivery is
    /// still attempted; callers decide whether to warn.
    pub oversize: bool,
}

/// Outcome of a search-then-deliver request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum FindOutcome {
    NoMatch,
    /// More than one candidate; the caller should ask which id to send.
    Candidates(Vec<SearchHit>),
    Deliver(DeliveryPlan),
}

/// Summary of a directory indexing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    pub added: usize,
    pub added_ids: Vec<String>,
    pub registry_path: PathBuf,
}

/// Basic information about the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubInfo {
    pub root_dir: PathBuf,
    pub registry_path: PathBuf,
    pub registry_exists: bool,
    pub entry_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_api_base: Option<String>,
}
