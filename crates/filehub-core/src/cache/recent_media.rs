//! Per-conversation cache of recently received media.
//!
//! Each conversation keeps a bounded FIFO of items; the oldest item is evicted
//! when the bound is hit, and items older than the TTL are swept on every
//! access. Conversations that see no writes for a full TTL are dropped by
//! the underlying `mini-moka` cache.

use crate::config::RecentMediaConfig;
use crate::error::{FileHubError, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use mini_moka::sync::Cache;
use serde::Serialize;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// Upper bound on tracked conversations.
const MAX_CONVERSATIONS: u64 = 1024;

/// Kind of media received in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    File,
}

/// One item seen in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentMedia {
    pub path: PathBuf,
    pub kind: MediaKind,
    /// Original file name as reported by the sender, if any.
    pub name: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl RecentMedia {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind, name: Option<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            name,
            captured_at: Utc::now(),
        }
    }
}

/// Bounded, TTL-swept media history keyed by conversation id.
pub struct RecentMediaCache {
    conversations: Cache<String, VecDeque<RecentMedia>>,
    capacity: usize,
    ttl: Duration,
    /// Serializes read-modify-write of a conversation's queue
    write_lock: Mutex<()>,
}

impl RecentMediaCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            conversations: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(MAX_CONVERSATIONS)
                .build(),
            capacity: capacity.max(1),
            ttl,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &RecentMediaConfig) -> Self {
        Self::new(config.capacity, config.ttl())
    }

    fn is_fresh(&self, item: &RecentMedia, now: DateTime<Utc>) -> bool {
        match ChronoDuration::from_std(self.ttl) {
            Ok(ttl) => now - item.captured_at < ttl,
            Err(_) => true,
        }
    }

    fn sweep(&self, items: &mut VecDeque<RecentMedia>) {
        let now = Utc::now();
        items.retain(|item| self.is_fresh(item, now));
    }

    /// Record an item, evicting the oldest when the conversation is full.
    pub fn record(&self, conversation: &str, item: RecentMedia) -> Result<()> {
        let _lock = self.write_lock.lock().map_err(|_| FileHubError::Lock {
            message: "Failed to acquire recent media lock".to_string(),
        })?;

        let key = conversation.to_string();
        let mut items = self.conversations.get(&key).unwrap_or_default();
        self.sweep(&mut items);
        items.push_back(item);
        while items.len() > self.capacity {
            items.pop_front();
        }
        self.conversations.insert(key, items);
        Ok(())
    }

    /// Live items for a conversation, newest first.
    pub fn list(&self, conversation: &str) -> Vec<RecentMedia> {
        let mut items = self
            .conversations
            .get(&conversation.to_string())
            .unwrap_or_default();
        self.sweep(&mut items);
        items.into_iter().rev().collect()
    }

    /// Item at `index` in newest-first order.
    pub fn get(&self, conversation: &str, index: usize) -> Option<RecentMedia> {
        self.list(conversation).into_iter().nth(index)
    }

    /// Forget everything recorded for a conversation.
    pub fn clear(&self, conversation: &str) {
        self.conversations.invalidate(&conversation.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> RecentMedia {
        RecentMedia::new(format!("/tmp/{}", name), MediaKind::Image, Some(name.to_string()))
    }

    fn names(items: &[RecentMedia]) -> Vec<&str> {
        items.iter().filter_map(|i| i.name.as_deref()).collect()
    }

    #[test]
    fn test_record_and_list_newest_first() {
        let cache = RecentMediaCache::new(5, Duration::from_secs(3600));
        cache.record("c1", item("a")).unwrap();
        cache.record("c1", item("b")).unwrap();
        cache.record("c2", item("z")).unwrap();

        assert_eq!(names(&cache.list("c1")), vec!["b", "a"]);
        assert_eq!(names(&cache.list("c2")), vec!["z"]);
        assert!(cache.list("c3").is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = RecentMediaCache::new(3, Duration::from_secs(3600));
        for name in ["1", "2", "3", "4", "5"] {
            cache.record("c", item(name)).unwrap();
        }
        assert_eq!(names(&cache.list("c")), vec!["5", "4", "3"]);
        assert_eq!(cache.get("c", 0).and_then(|i| i.name), Some("5".to_string()));
        assert!(cache.get("c", 3).is_none());
    }

    #[test]
    fn test_expired_items_are_swept() {
        let cache = RecentMediaCache::new(5, Duration::from_secs(3600));
        let mut stale = item("old");
        stale.captured_at = Utc::now() - ChronoDuration::hours(2);
        cache.record("c", stale).unwrap();
        cache.record("c", item("new")).unwrap();

        assert_eq!(names(&cache.list("c")), vec!["new"]);
    }

    #[test]
    fn test_clear() {
        let cache = RecentMediaCache::new(5, Duration::from_secs(3600));
        cache.record("c", item("a")).unwrap();
        cache.clear("c");
        assert!(cache.list("c").is_empty());
    }
}
