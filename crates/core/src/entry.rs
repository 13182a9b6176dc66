//! Entry: one captured-text record
//!
//! ## Identity
//!
//! `id` and `timestamp` are assigned when the entry is created and never
//! change afterwards, so they are only reachable through accessors.
//!
//! ## Tags
//!
//! Tags keep the casing they were added with, but uniqueness is checked
//! ignoring case: adding `"work"` to an entry tagged `"Work"` is a no-op.
//!
//! ## Character count
//!
//! `character_count` is captured from `extracted_text` at construction. Later
//! edits to the text do not update it.
//!
//! ## On-disk form
//!
//! Entries serialize with camelCase keys. Deserialization is lenient: missing
//! fields get their defaults, `null` strings read as empty, timestamps
//! without an offset are taken as UTC, and case-duplicate tags are dropped.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::text::eq_ignore_case;

/// Category assigned to entries that don't specify one
pub const DEFAULT_CATEGORY: &str = "General";

/// A captured text snippet with its artifact references and metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default = "new_entry_id", deserialize_with = "string_or_null")]
    id: String,

    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    timestamp: DateTime<Utc>,

    /// Text extracted from the capture
    #[serde(default, deserialize_with = "string_or_null")]
    pub extracted_text: String,

    /// Path to the full-size image artifact (empty when none)
    #[serde(default, deserialize_with = "string_or_null")]
    pub image_path: String,

    /// Path to the thumbnail artifact (empty when none)
    #[serde(default, deserialize_with = "string_or_null")]
    pub thumbnail_path: String,

    #[serde(default, deserialize_with = "unique_tags")]
    tags: Vec<String>,

    /// Free-form category
    #[serde(default = "default_category", deserialize_with = "category_or_default")]
    pub category: String,

    #[serde(default)]
    character_count: usize,
}

impl Entry {
    /// Create a new entry with a fresh id and the current time
    ///
    /// The character count is taken from `extracted_text` here and only here.
    pub fn new(
        extracted_text: impl Into<String>,
        image_path: impl Into<String>,
        thumbnail_path: impl Into<String>,
    ) -> Self {
        Self::with_identity(new_entry_id(), Utc::now(), extracted_text)
            .with_artifacts(image_path, thumbnail_path)
    }

    /// Create an entry with a caller-chosen id and timestamp
    ///
    /// Used when importing records that already have an identity.
    pub fn with_identity(
        id: impl Into<String>,
        timestamp: DateTime<Utc>,
        extracted_text: impl Into<String>,
    ) -> Self {
        let extracted_text = extracted_text.into();
        let character_count = extracted_text.chars().count();
        Entry {
            id: id.into(),
            timestamp,
            extracted_text,
            image_path: String::new(),
            thumbnail_path: String::new(),
            tags: Vec::new(),
            category: default_category(),
            character_count,
        }
    }

    /// Set the image and thumbnail paths
    pub fn with_artifacts(
        mut self,
        image_path: impl Into<String>,
        thumbnail_path: impl Into<String>,
    ) -> Self {
        self.image_path = image_path.into();
        self.thumbnail_path = thumbnail_path.into();
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Add tags, skipping blanks and case-insensitive duplicates
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.add_tag(tag.as_ref());
        }
        self
    }

    /// Unique identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Length of the text at construction, in characters
    pub fn character_count(&self) -> usize {
        self.character_count
    }

    /// Tags in insertion order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check for a tag, ignoring case
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| eq_ignore_case(t, tag))
    }

    /// Add a tag
    ///
    /// The tag is trimmed first. Returns `false` (and changes nothing) when
    /// the tag is blank or already present ignoring case.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag, ignoring case. Returns `true` if one was removed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| !eq_ignore_case(t, tag.trim()));
        self.tags.len() != before
    }

    /// Non-empty artifact paths owned by this entry
    pub fn artifact_paths(&self) -> impl Iterator<Item = &str> {
        [self.image_path.as_str(), self.thumbnail_path.as_str()]
            .into_iter()
            .filter(|p| !p.is_empty())
    }
}

fn new_entry_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn category_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_category))
}

fn unique_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw.into_iter().flatten() {
        if !tag.trim().is_empty() && !tags.iter().any(|t| eq_ignore_case(t, &tag)) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognized timestamp '{}'", raw))
    })
}

/// Parse an RFC 3339 timestamp, or a naive one interpreted as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
