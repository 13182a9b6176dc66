//! Case-insensitive text helpers
//!
//! Tags and search terms are compared after Unicode lowercasing. All
//! case-insensitive comparisons in the workspace go through these helpers so
//! that tag uniqueness, tag lookup and search agree on what "equal ignoring
//! case" means.

/// Lowercase `s` for case-insensitive comparison
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Compare two strings ignoring case
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    fold_case(a) == fold_case(b)
}

/// Check whether `haystack` contains an already-folded needle, ignoring case
pub fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    fold_case(haystack).contains(folded_needle)
}
