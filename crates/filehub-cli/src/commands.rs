//! Subcommand dispatch.
//!
//! Each subcommand calls one `FileHub` operation and renders the result:
//! `list` prints brief text lines, everything else prints pretty JSON.

use crate::{Command, MetaArgs, PermArgs};
use filehub_core::config::save_callback_base;
use filehub_core::{
    format_brief, FileHub, FileHubError, ImportRequest, IndexMode, MetadataUpdate,
    PermissionUpdate, Principals, Requester, Result,
};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

/// Text shown when `list` finds nothing.
const NO_MATCHES: &str = "No matching files.";

/// Run one subcommand. `config_path` is the `--config` file, if any, which
/// `set-callback` writes back to.
pub fn execute(
    hub: &FileHub,
    requester: &Requester,
    config_path: Option<&Path>,
    command: Command,
) -> Result<String> {
    match command {
        Command::List { query } => {
            let hits = hub.list(requester, &query.join(" "));
            if hits.is_empty() {
                return Ok(NO_MATCHES.to_string());
            }
            let lines: Vec<String> = hits.iter().map(|h| format_brief(&h.entry)).collect();
            Ok(lines.join("\n"))
        }
        Command::Search { query } => to_json(&hub.search_for_tool(requester, &query.join(" "))),
        Command::Send { id } => to_json(&hub.prepare_delivery(requester, &id)?),
        Command::Find { query } => to_json(&hub.find_and_prepare(requester, &query.join(" "))?),
        Command::Index { mode, no_recursive } => {
            let mode: IndexMode = mode.parse()?;
            to_json(&hub.index_directory(mode, !no_recursive)?)
        }
        Command::Info => to_json(&hub.info()),
        Command::Classify { path } => to_json(&hub.classify(&path)),
        Command::SetMeta { id, meta } => {
            let update = metadata_update(meta);
            if update.is_empty() {
                return Err(FileHubError::validation("set-meta", "nothing to update"));
            }
            to_json(&hub.update_metadata(&id, update)?)
        }
        Command::SetPerm { id, perms } => {
            to_json(&hub.update_permissions(&id, permission_update(perms))?)
        }
        Command::Remove { id, delete_file } => to_json(&hub.remove(&id, delete_file)?),
        Command::Import { path, id, meta } => {
            let request = ImportRequest {
                id,
                name: meta.name,
                description: meta.description.unwrap_or_default(),
                tags: meta.tags.unwrap_or_default(),
                send_as: meta.send_as,
            };
            to_json(&hub.import_file(&path, request)?)
        }
        Command::SetCallback { url } => {
            let url = hub.set_callback_base(&url)?;
            let saved_to = match config_path {
                Some(path) => {
                    save_callback_base(path, &url)?;
                    Some(path.display().to_string())
                }
                None => None,
            };
            to_json(&json!({ "callback_api_base": url, "saved_to": saved_to }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn metadata_update(meta: MetaArgs) -> MetadataUpdate {
    MetadataUpdate {
        name: meta.name,
        description: meta.description,
        tags: meta.tags.map(clean_list),
        send_as: meta.send_as,
    }
}

fn permission_update(perms: PermArgs) -> PermissionUpdate {
    let side = |clear: bool, users: Option<Vec<String>>, groups: Option<Vec<String>>| {
        if clear {
            return Some(Principals::default());
        }
        if users.is_none() && groups.is_none() {
            return None;
        }
        Some(Principals {
            users: clean_list(users.unwrap_or_default()),
            groups: clean_list(groups.unwrap_or_default()),
        })
    };
    PermissionUpdate {
        allow: side(perms.clear_allow, perms.allow_users, perms.allow_groups),
        deny: side(perms.clear_deny, perms.deny_users, perms.deny_groups),
    }
}

/// Trim items and drop empties left by stray commas.
fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_update_sides() {
        let update = permission_update(PermArgs {
            allow_users: Some(vec!["1".into(), " ".into()]),
            clear_deny: true,
            ..Default::default()
        });
        assert_eq!(
            update.allow,
            Some(Principals {
                users: vec!["1".into()],
                groups: Vec::new(),
            })
        );
        assert_eq!(update.deny, Some(Principals::default()));

        let untouched = permission_update(PermArgs::default());
        assert!(untouched.allow.is_none() && untouched.deny.is_none());
    }

    #[test]
    fn test_metadata_update_cleans_tags() {
        let update = metadata_update(MetaArgs {
            tags: Some(vec!["a".into(), "".into(), " b ".into()]),
            ..Default::default()
        });
        assert_eq!(update.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(update.name.is_none());
    }
}
