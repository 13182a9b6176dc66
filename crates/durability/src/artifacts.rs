//! Artifact cleanup
//!
//! Entries reference image and thumbnail files that live outside the
//! history file. When an entry is removed, [`ArtifactCleaner`] deletes them.
//!
//! # Design Notes
//!
//! - Runs only after the entry removal has been persisted
//! - Each path is deleted independently; one failure doesn't stop the other
//! - Paths that are already gone count as `missing`, not as failures
//! - Failures are logged and reported, never propagated

use std::io;
use std::path::Path;

use snaptext_core::{Entry, HistoryError};
use tracing::warn;

/// Outcome of a cleanup pass
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files deleted
    pub removed: usize,
    /// Referenced files that no longer existed
    pub missing: usize,
    /// Files that could not be deleted
    pub failed: Vec<HistoryError>,
}

impl CleanupReport {
    /// True if every referenced file is gone
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn merge(&mut self, other: CleanupReport) {
        self.removed += other.removed;
        self.missing += other.missing;
        self.failed.extend(other.failed);
    }
}

/// Best-effort deleter for entry artifacts
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactCleaner;

impl ArtifactCleaner {
    /// Create a new cleaner
    pub fn new() -> Self {
        ArtifactCleaner
    }

    /// Delete the image and thumbnail of one entry
    pub fn remove_for(&self, entry: &Entry) -> CleanupReport {
        let mut report = CleanupReport::default();
        for path in entry.artifact_paths() {
            match remove_artifact(Path::new(path)) {
                Ok(true) => report.removed += 1,
                Ok(false) => report.missing += 1,
                Err(e) => {
                    warn!(
                        target: "snaptext::durability",
                        entry_id = entry.id(),
                        error = %e,
                        "Artifact cleanup failed"
                    );
                    report.failed.push(e);
                }
            }
        }
        report
    }

    /// Delete the artifacts of every entry
    pub fn remove_all<'a, I>(&self, entries: I) -> CleanupReport
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut report = CleanupReport::default();
        for entry in entries {
            report.merge(self.remove_for(entry));
        }
        report
    }
}

/// Delete one file. `Ok(false)` if it was already gone.
fn remove_artifact(path: &Path) -> Result<bool, HistoryError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(HistoryError::ArtifactCleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry_with_files(dir: &TempDir, name: &str) -> Entry {
        let image = dir.path().join(format!("{}.png", name));
        let thumb = dir.path().join(format!("{}_thumb.png", name));
        std::fs::write(&image, b"png").unwrap();
        std::fs::write(&thumb, b"png").unwrap();
        Entry::new("text", image.to_string_lossy(), thumb.to_string_lossy())
    }

    #[test]
    fn test_removes_both_files() {
        let dir = TempDir::new().unwrap();
        let entry = entry_with_files(&dir, "a");

        let report = ArtifactCleaner::new().remove_for(&entry);

        assert_eq!(report.removed, 2);
        assert_eq!(report.missing, 0);
        assert!(report.is_clean());
        assert!(!Path::new(&entry.image_path).exists());
        assert!(!Path::new(&entry.thumbnail_path).exists());
    }

    #[test]
    fn test_missing_files_are_not_failures() {
        let dir = TempDir::new().unwrap();
        let entry = entry_with_files(&dir, "b");
        std::fs::remove_file(&entry.image_path).unwrap();

        let report = ArtifactCleaner::new().remove_for(&entry);

        assert_eq!(report.removed, 1);
        assert_eq!(report.missing, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_empty_paths_are_skipped() {
        let entry = Entry::new("no artifacts", "", "");
        let report = ArtifactCleaner::new().remove_for(&entry);

        assert_eq!(report.removed, 0);
        assert_eq!(report.missing, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_failure_does_not_block_other_path() {
        let dir = TempDir::new().unwrap();
        // A directory can't be removed with remove_file
        let image_dir = dir.path().join("image_dir");
        std::fs::create_dir(&image_dir).unwrap();
        let thumb = dir.path().join("thumb.png");
        std::fs::write(&thumb, b"png").unwrap();

        let entry = Entry::new("x", image_dir.to_string_lossy(), thumb.to_string_lossy());
        let report = ArtifactCleaner::new().remove_for(&entry);

        assert_eq!(report.removed, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0],
            HistoryError::ArtifactCleanup { .. }
        ));
        assert!(!thumb.exists());
        assert!(image_dir.exists());
    }

    #[test]
    fn test_remove_all_merges_reports() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            entry_with_files(&dir, "one"),
            entry_with_files(&dir, "two"),
            Entry::new("bare", "", ""),
        ];

        let report = ArtifactCleaner::new().remove_all(&entries);

        assert_eq!(report.removed, 4);
        assert!(report.is_clean());
    }
}
