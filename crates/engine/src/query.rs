//! Query engine: read-only scans over the entry collection
//!
//! Every query is a single linear pass over the slice it is given and
//! returns owned copies. Nothing here mutates or keeps an index; the
//! collection is a personal history, small enough that a scan is cheap.
//!
//! Result lists are ordered newest first. Entries with equal timestamps keep
//! their collection order.

use snaptext_core::{contains_folded, fold_case, Entry};
use std::collections::HashSet;

/// All entries, newest first
pub fn all(entries: &[Entry]) -> Vec<Entry> {
    newest_first(entries.iter())
}

/// The entry with the given id, if any
pub fn by_id(entries: &[Entry], id: &str) -> Option<Entry> {
    entries.iter().find(|e| e.id() == id).cloned()
}

/// Entries whose text, tags or category contain `term`, ignoring case
///
/// A blank term matches nothing.
pub fn search(entries: &[Entry], term: &str) -> Vec<Entry> {
    if term.trim().is_empty() {
        return Vec::new();
    }
    let needle = fold_case(term);
    newest_first(entries.iter().filter(|e| matches_term(e, &needle)))
}

/// Entries carrying `tag`, ignoring case
///
/// A blank tag matches nothing.
pub fn by_tag(entries: &[Entry], tag: &str) -> Vec<Entry> {
    if tag.trim().is_empty() {
        return Vec::new();
    }
    newest_first(entries.iter().filter(|e| e.has_tag(tag)))
}

/// Distinct tags across all entries, ascending
///
/// Tags that differ only in case are reported once, with the casing of the
/// first occurrence in collection order. Sorting compares the case-folded
/// form, so `"apple"` sorts before `"Banana"`.
pub fn all_tags(entries: &[Entry]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags: Vec<(String, String)> = Vec::new();

    for tag in entries.iter().flat_map(|e| e.tags()) {
        let folded = fold_case(tag);
        if seen.insert(folded.clone()) {
            tags.push((folded, tag.clone()));
        }
    }

    tags.sort_by(|a, b| a.0.cmp(&b.0));
    tags.into_iter().map(|(_, tag)| tag).collect()
}

/// Number of entries
pub fn count(entries: &[Entry]) -> usize {
    entries.len()
}

/// Check whether an id is already used
pub fn contains_id(entries: &[Entry], id: &str) -> bool {
    entries.iter().any(|e| e.id() == id)
}

fn matches_term(entry: &Entry, needle: &str) -> bool {
    contains_folded(&entry.extracted_text, needle)
        || entry.tags().iter().any(|t| contains_folded(t, needle))
        || contains_folded(&entry.category, needle)
}

fn newest_first<'a>(entries: impl Iterator<Item = &'a Entry>) -> Vec<Entry> {
    let mut out: Vec<Entry> = entries.cloned().collect();
    out.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    out
}
