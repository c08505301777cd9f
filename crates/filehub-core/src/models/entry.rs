//! Catalog document types: entries, permission rules, and the registry.

use super::lenient;
use crate::error::{FileHubError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Delivery hint for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SendAs {
    /// Decide by file extension at delivery time.
    #[default]
    Auto,
    Image,
    File,
}

impl SendAs {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendAs::Auto => "auto",
            SendAs::Image => "image",
            SendAs::File => "file",
        }
    }
}

impl FromStr for SendAs {
    type Err = FileHubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(SendAs::Auto),
            "image" => Ok(SendAs::Image),
            "file" => Ok(SendAs::File),
            other => Err(FileHubError::validation(
                "send_as",
                format!("unsupported value '{}', expected auto, image or file", other),
            )),
        }
    }
}

impl fmt::Display for SendAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SendAs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SendAs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = lenient::string(deserializer)?;
        match raw.parse() {
            Ok(send_as) => Ok(send_as),
            Err(_) => {
                // Stored documents degrade to auto; writes go through FromStr.
                warn!("Unknown send_as value {:?} in catalog, treating as auto", raw);
                Ok(SendAs::Auto)
            }
        }
    }
}

/// A set of user and group identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principals {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub users: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub groups: Vec<String>,
}

impl Principals {
    pub fn new<U, G>(users: U, groups: G) -> Self
    where
        U: IntoIterator,
        U::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            users: users.into_iter().map(Into::into).collect(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// True when neither users nor groups are listed.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    pub fn contains_user(&self, user: &str) -> bool {
        self.users.iter().any(|u| u == user)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Entry-level allow and deny rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub allow: Principals,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub deny: Principals,
}

/// One catalogued file.
///
/// Keys this type does not model are kept in `extra` and written back on
/// save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub path: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_string"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "lenient::string_list"
    )]
    pub tags: Vec<String>,
    #[serde(default)]
    pub send_as: SendAs,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub permissions: Permissions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Base name of the entry's path, or an empty string.
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }

    /// Display name: the explicit name when set, otherwise the path's base name.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.file_name(),
        }
    }
}

/// The full catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Registry {
    pub files: Vec<Entry>,
    /// Unknown top-level keys, preserved across a load/save cycle.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Registry {
    pub fn new(files: Vec<Entry>) -> Self {
        Self {
            files,
            extra: Map::new(),
        }
    }

    /// Build a registry from a parsed JSON document.
    ///
    /// Returns `None` when the top level is not an object. A missing or
    /// non-list `files` key yields an empty list; list elements that do not
    /// decode as entries are skipped and counted in the second tuple field.
    pub fn from_document(document: Value) -> Option<(Self, usize)> {
        let Value::Object(mut map) = document else {
            return None;
        };

        let raw_files = match map.remove("files") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        let mut skipped = 0;
        let files = raw_files
            .into_iter()
            .filter_map(|item| {
                if !item.is_object() {
                    skipped += 1;
                    return None;
                }
                match serde_json::from_value::<Entry>(item) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Skipping undecodable catalog entry: {}", e);
                        skipped += 1;
                        None
                    }
                }
            })
            .collect();

        Some((Self { files, extra: map }, skipped))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Entry> {
        self.files.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.files.iter_mut().find(|e| e.id == id)
    }

    /// Remove and return the entry with the given id.
    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let pos = self.files.iter().position(|e| e.id == id)?;
        Some(self.files.remove(pos))
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.files.iter().map(|e| e.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_as_parse() {
        assert_eq!("IMAGE".parse::<SendAs>().unwrap(), SendAs::Image);
        assert_eq!(" file ".parse::<SendAs>().unwrap(), SendAs::File);
        assert_eq!("".parse::<SendAs>().unwrap(), SendAs::Auto);
        assert!(matches!(
            "video".parse::<SendAs>(),
            Err(FileHubError::Validation { .. })
        ));
    }

    #[test]
    fn test_entry_decodes_loose_document() {
        let entry: Entry = serde_json::from_value(json!({
            "id": 17,
            "path": "docs/manual.pdf",
            "send_as": "Image",
            "permissions": {"allow": {"users": 10001, "groups": null}, "deny": "nope"},
            "owner": "ops"
        }))
        .unwrap();

        assert_eq!(entry.id, "17");
        assert_eq!(entry.send_as, SendAs::Image);
        assert_eq!(entry.permissions.allow.users, vec!["10001"]);
        assert!(entry.permissions.allow.groups.is_empty());
        assert!(entry.permissions.deny.is_empty());
        assert_eq!(entry.extra.get("owner"), Some(&json!("ops")));
        assert_eq!(entry.display_name(), "manual.pdf");
    }

    #[test]
    fn test_unknown_send_as_decodes_as_auto() {
        let entry: Entry =
            serde_json::from_value(json!({"id": "a", "send_as": "video"})).unwrap();
        assert_eq!(entry.send_as, SendAs::Auto);
    }

    #[test]
    fn test_display_name_prefers_name() {
        let mut entry = Entry::new("logo", "img/logo.png");
        assert_eq!(entry.display_name(), "logo.png");
        entry.name = Some("Company Logo".into());
        assert_eq!(entry.display_name(), "Company Logo");
        entry.name = Some(String::new());
        assert_eq!(entry.display_name(), "logo.png");
    }

    #[test]
    fn test_registry_from_document() {
        let (registry, skipped) = Registry::from_document(json!({
            "version": 2,
            "files": [{"id": "a", "path": "a.txt"}, "garbage", {"id": "b"}]
        }))
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(registry.extra.get("version"), Some(&json!(2)));

        let (registry, _) = Registry::from_document(json!({"files": {"a": 1}})).unwrap();
        assert!(registry.is_empty());

        assert!(Registry::from_document(json!([1, 2])).is_none());
    }

    #[test]
    fn test_registry_remove() {
        let mut registry = Registry::new(vec![Entry::new("a", "a"), Entry::new("b", "b")]);
        assert_eq!(registry.remove("a").map(|e| e.id), Some("a".to_string()));
        assert!(registry.remove("a").is_none());
        assert_eq!(registry.ids().into_iter().collect::<Vec<_>>(), vec!["b"]);
    }
}
