//! Export of entry lists to CSV, plain text and JSON
//!
//! Exports are read-only consumers of the store: they take a list of entries
//! (typically the result of a query) and write a file. Every format lists
//! entries newest first. Timestamps are rendered in the local time zone.

use chrono::{DateTime, Local, TimeZone};
use snaptext_core::Entry;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Timestamp layout used in CSV and text exports
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CSV_HEADER: &str = "Timestamp,Text,Tags,Category,Character Count,Image Path";

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Human-readable report
    Text,
    /// Indented JSON array, same schema as the history file
    Json,
}

impl ExportFormat {
    /// Pick a format from a path's extension (case-insensitive)
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "txt" => Some(ExportFormat::Text),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Writing the output file failed
    #[error("failed to write export to '{path}': {source}")]
    Io {
        /// Output path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed
    #[error("failed to encode export: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No format given and none recognizable from the path
    #[error("cannot infer export format from '{0}'")]
    UnknownFormat(PathBuf),
}

/// Write `entries` to `path` in `format`
pub fn export_to_path(entries: &[Entry], path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    let body = match format {
        ExportFormat::Csv => render_csv(entries, &Local),
        ExportFormat::Text => render_text(entries, Local::now()),
        ExportFormat::Json => render_json(entries)?,
    };
    std::fs::write(path, body.as_bytes()).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        target: "snaptext::store",
        path = %path.display(),
        entries = entries.len(),
        ?format,
        "Exported history"
    );
    Ok(())
}

/// Write `entries` to `path`, picking the format from its extension
pub fn export_by_extension(entries: &[Entry], path: &Path) -> Result<(), ExportError> {
    let format = ExportFormat::from_extension(path)
        .ok_or_else(|| ExportError::UnknownFormat(path.to_path_buf()))?;
    export_to_path(entries, path, format)
}

/// Run an export on the blocking pool, reporting success as a flag
pub(crate) async fn export_async(entries: Vec<Entry>, path: PathBuf, format: ExportFormat) -> bool {
    let task = tokio::task::spawn_blocking(move || {
        export_to_path(&entries, &path, format).map_err(|e| (path, e))
    });
    match task.await {
        Ok(Ok(())) => true,
        Ok(Err((path, e))) => {
            warn!(target: "snaptext::store", path = %path.display(), error = %e, "Export failed");
            false
        }
        Err(e) => {
            warn!(target: "snaptext::store", error = %e, "Export task did not complete");
            false
        }
    }
}

/// Suggested file name for an export made at `now`, without extension
pub fn default_file_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("SnapText_History_{}", now.format("%Y%m%d_%H%M%S"))
}

/// CSV with a header row, timestamps rendered in `tz`
pub fn render_csv<Tz>(entries: &[Entry], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');

    for entry in sorted(entries) {
        let fields = [
            local_time(entry, tz),
            escape_csv(&entry.extracted_text),
            escape_csv(&entry.tags().join("; ")),
            escape_csv(&entry.category),
            entry.character_count().to_string(),
            escape_csv(&entry.image_path),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Plain-text report generated at `now`
///
/// Entry timestamps are rendered in the time zone of `now`.
pub fn render_text<Tz>(entries: &[Entry], now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let mut lines: Vec<String> = vec![
        "SnapText History Export".to_string(),
        format!("Generated: {}", now.format(TIMESTAMP_FORMAT)),
        format!("Total Entries: {}", entries.len()),
        "=".repeat(50),
        String::new(),
    ];

    for entry in sorted(entries) {
        lines.push(format!("Date: {}", local_time(entry, &tz)));
        lines.push(format!("Category: {}", entry.category));
        if !entry.tags().is_empty() {
            lines.push(format!("Tags: {}", entry.tags().join(", ")));
        }
        lines.push(format!("Characters: {}", entry.character_count()));
        lines.push(String::new());
        lines.push("Text:".to_string());
        lines.push(entry.extracted_text.clone());
        lines.push(String::new());
        lines.push("-".repeat(30));
        lines.push(String::new());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Indented JSON array, newest first
pub fn render_json(entries: &[Entry]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&sorted(entries))?)
}

fn sorted(entries: &[Entry]) -> Vec<&Entry> {
    let mut out: Vec<&Entry> = entries.iter().collect();
    out.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    out
}

fn local_time<Tz>(entry: &Entry, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    entry
        .timestamp()
        .with_timezone(tz)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

fn escape_csv(field: &str) -> String {
    if field.is_empty() {
        return "\"\"".to_string();
    }
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        return format!("\"{}\"", field.replace('"', "\"\""));
    }
    field.to_string()
}
