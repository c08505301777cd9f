//! Keyword ranking over catalog entries.
//!
//! Scores are additive across fields:
//!
//! | match                                  | score |
//! |----------------------------------------|-------|
//! | query equals id, file name or name     | +10   |
//! | query in id                            | +6    |
//! | query in file name                     | +5    |
//! | query in name                          | +4    |
//! | query in any tag                       | +3    |
//! | query in description                   | +2    |
//!
//! All comparisons are case-insensitive.

use crate::models::Entry;

const EXACT_MATCH: u32 = 10;
const ID_MATCH: u32 = 6;
const FILE_NAME_MATCH: u32 = 5;
const NAME_MATCH: u32 = 4;
const TAG_MATCH: u32 = 3;
const DESCRIPTION_MATCH: u32 = 2;

/// Score a single entry against an already lowercased, trimmed query.
pub fn score_entry(entry: &Entry, query: &str) -> u32 {
    let id = entry.id.to_lowercase();
    let file_name = entry.file_name().to_lowercase();
    let name = entry.name.as_deref().unwrap_or("").to_lowercase();
    let description = entry.description.to_lowercase();

    let mut score = 0;
    if query == id || query == file_name || query == name {
        score += EXACT_MATCH;
    }
    if id.contains(query) {
        score += ID_MATCH;
    }
    if file_name.contains(query) {
        score += FILE_NAME_MATCH;
    }
    if name.contains(query) {
        score += NAME_MATCH;
    }
    if entry.tags.iter().any(|t| t.to_lowercase().contains(query)) {
        score += TAG_MATCH;
    }
    if description.contains(query) {
        score += DESCRIPTION_MATCH;
    }
    score
}

/// Rank entries against `query`, best first.
///
/// A blank query returns every entry with score 0 in original order.
/// Otherwise only entries scoring above zero are returned; ties keep their
/// original relative order.
pub fn rank<'a, I>(entries: I, query: &str) -> Vec<(u32, &'a Entry)>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return entries.into_iter().map(|e| (0, e)).collect();
    }

    let mut results: Vec<(u32, &Entry)> = entries
        .into_iter()
        .map(|e| (score_entry(e, &query), e))
        .filter(|(score, _)| *score > 0)
        .collect();
    // sort_by is stable
    results.sort_by(|a, b| b.0.cmp(&a.0));
    results
}

/// One-line summary: `id | name | description | tags: a, b`.
pub fn format_brief(entry: &Entry) -> String {
    format!(
        "{} | {} | {} | tags: {}",
        entry.id,
        entry.display_name(),
        entry.description,
        entry.tags.join(", ")
    )
}
