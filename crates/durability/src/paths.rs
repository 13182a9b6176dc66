//! History directory structure
//!
//! A history store lives in one application-private directory:
//!
//! ```text
//! <data_dir>/
//! ├── history.json          # Primary file (live collection)
//! ├── history.backup.json   # Backup (collection as of the previous save)
//! └── history.json.tmp      # Present only while a save is in flight
//! ```

use std::path::{Path, PathBuf};

/// Default primary file name
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Default backup file name
pub const BACKUP_FILE_NAME: &str = "history.backup.json";

/// Suffix appended to the primary file name for in-flight saves
pub const TEMP_SUFFIX: &str = ".tmp";

/// History directory paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPaths {
    root: PathBuf,
    history_file: String,
    backup_file: String,
}

impl HistoryPaths {
    /// Create paths with the default file names
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        Self::with_file_names(root, HISTORY_FILE_NAME, BACKUP_FILE_NAME)
    }

    /// Create paths with custom primary and backup file names
    pub fn with_file_names(
        root: impl AsRef<Path>,
        history_file: impl Into<String>,
        backup_file: impl Into<String>,
    ) -> Self {
        HistoryPaths {
            root: root.as_ref().to_path_buf(),
            history_file: history_file.into(),
            backup_file: backup_file.into(),
        }
    }

    /// Get the data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the primary file path
    pub fn primary(&self) -> PathBuf {
        self.root.join(&self.history_file)
    }

    /// Get the backup file path
    pub fn backup(&self) -> PathBuf {
        self.root.join(&self.backup_file)
    }

    /// Get the temporary file path used during saves
    pub fn temp(&self) -> PathBuf {
        self.root
            .join(format!("{}{}", self.history_file, TEMP_SUFFIX))
    }

    /// Check if a primary file exists
    pub fn exists(&self) -> bool {
        self.primary().exists()
    }

    /// Create the data directory
    pub fn create_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}
