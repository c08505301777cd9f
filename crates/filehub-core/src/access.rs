//! Per-requester access decisions.
//!
//! Rules, in order:
//! 1. Entry deny plus global deny: any match denies. Deny always wins.
//! 2. Entry declares no allow list: the global allow lists apply if any are
//!    set, otherwise everyone is allowed.
//! 3. Entry declares an allow list: only that list counts. Global allow lists
//!    are not merged in.

use crate::config::AccessDefaults;
use crate::models::Entry;
use serde::{Deserialize, Serialize};

/// Who is asking. Empty strings mean "no group" / "no user".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requester {
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub sender_id: String,
}

impl Requester {
    pub fn new(group_id: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            sender_id: sender_id.into(),
        }
    }

    /// A requester with no identity at all.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Decide whether `group_id`/`sender_id` may access `entry`.
pub fn has_access(entry: &Entry, group_id: &str, sender_id: &str, defaults: &AccessDefaults) -> bool {
    let perms = &entry.permissions;

    if perms.deny.contains_user(sender_id)
        || defaults.deny.contains_user(sender_id)
        || perms.deny.contains_group(group_id)
        || defaults.deny.contains_group(group_id)
    {
        return false;
    }

    if perms.allow.is_empty() {
        if defaults.allow.is_empty() {
            return true;
        }
        return defaults.allow.contains_user(sender_id) || defaults.allow.contains_group(group_id);
    }

    perms.allow.contains_user(sender_id) || perms.allow.contains_group(group_id)
}

/// [`has_access`] for a [`Requester`].
pub fn requester_has_access(entry: &Entry, requester: &Requester, defaults: &AccessDefaults) -> bool {
    has_access(entry, &requester.group_id, &requester.sender_id, defaults)
}

/// Keep only the entries the requester may see, in their original order.
pub fn filter_accessible<'a, I>(entries: I, requester: &Requester, defaults: &AccessDefaults) -> Vec<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .filter(|e| requester_has_access(e, requester, defaults))
        .collect()
}
