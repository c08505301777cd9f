//! Entry id generation.
//!
//! Ids are slugs of the file's base name: lowercase ASCII alphanumerics
//! joined by single underscores. Collisions get a numeric suffix.

use crate::error::{FileHubError, Result};
use crate::models::Entry;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// Slug used when a name has no usable characters.
const FALLBACK_SLUG: &str = "file";

/// Runs of characters outside `[a-z0-9]`.
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Slugify a raw string without touching path structure.
fn slug(raw: &str) -> String {
    NON_SLUG
        .replace_all(&raw.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Derive a slug from a file name or path.
///
/// # Rules Applied
/// 1. Take the base name and drop its extension
/// 2. Convert to lowercase
/// 3. Collapse every run of characters outside `[a-z0-9]` into one `_`
/// 4. Trim leading/trailing `_`
/// 5. Use `"file"` if nothing is left
pub fn slugify(seed: &str) -> String {
    let stem = Path::new(seed)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let result = slug(stem);
    if result.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        result
    }
}

/// Generate an id for `seed` that no entry in `existing` uses.
///
/// Tries the bare slug first, then `slug_2`, `slug_3`, ... Deterministic for
/// a given seed and id set.
pub fn generate_unique_id<'a, I>(existing: I, seed: &str) -> String
where
    I: IntoIterator<Item = &'a Entry>,
{
    let used: HashSet<&str> = existing.into_iter().map(|e| e.id.as_str()).collect();
    unique_from(&slugify(seed), &used)
}

fn unique_from(base: &str, used: &HashSet<&str>) -> String {
    if !used.contains(base) {
        return base.to_string();
    }
    (2u64..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !used.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Validate a caller-chosen id.
///
/// The id is slugified as a whole (dots included) and must be non-empty and
/// unused.
pub fn validate_requested_id<'a, I>(existing: I, requested: &str) -> Result<String>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let id = slug(requested);
    if id.is_empty() {
        return Err(FileHubError::validation(
            "id",
            format!("'{}' has no usable characters", requested),
        ));
    }
    if existing.into_iter().any(|e| e.id == id) {
        return Err(FileHubError::validation(
            "id",
            format!("id '{}' is already in use", id),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(ids: &[&str]) -> Vec<Entry> {
        ids.iter().map(|id| Entry::new(*id, "")).collect()
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Company Logo.PNG"), "company_logo");
        assert_eq!(slugify("docs/Q3 Report (final).pdf"), "q3_report_final");
        assert_eq!(slugify("__weird--name__.txt"), "weird_name");
        assert_eq!(slugify("archive.tar.gz"), "archive_tar");
    }

    #[test]
    fn test_slugify_fallback() {
        assert_eq!(slugify(""), "file");
        assert_eq!(slugify("设计图.png"), "file");
        assert_eq!(slugify("---.txt"), "file");
    }

    #[test]
    fn test_generate_unique_id_suffixes() {
        let existing = entries(&["logo", "logo_2", "report"]);
        assert_eq!(generate_unique_id(&existing, "Logo.png"), "logo_3");
        assert_eq!(generate_unique_id(&existing, "report.pdf"), "report_2");
        assert_eq!(generate_unique_id(&existing, "new.txt"), "new");
    }

    #[test]
    fn test_generate_unique_id_never_collides() {
        let mut existing = entries(&["file", "file_2", "file_4", "a"]);
        for seed in ["", "!!!", "A", "a.png", "file", "FILE_2.txt"] {
            let id = generate_unique_id(&existing, seed);
            assert!(existing.iter().all(|e| e.id != id), "{} collided", id);
            existing.push(Entry::new(id, ""));
        }
    }

    #[test]
    fn test_generate_unique_id_deterministic() {
        let existing = entries(&["photo"]);
        assert_eq!(
            generate_unique_id(&existing, "Photo.jpg"),
            generate_unique_id(&existing, "Photo.jpg")
        );
    }

    #[test]
    fn test_validate_requested_id() {
        let existing = entries(&["logo"]);
        assert_eq!(validate_requested_id(&existing, "Brand Kit").unwrap(), "brand_kit");
        assert!(validate_requested_id(&existing, "LOGO").is_err());
        assert!(validate_requested_id(&existing, "***").is_err());
    }
}
