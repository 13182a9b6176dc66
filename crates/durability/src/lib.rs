//! Durability layer for the SnapText history store
//!
//! This crate handles everything that touches disk:
//!
//! - Paths: the data directory and the primary/backup/temporary file names
//! - History file: load with backup fallback, crash-safe save with backup
//! - Artifacts: best-effort deletion of image files owned by removed entries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifacts; // Image/thumbnail cleanup on entry removal
pub mod history_file; // Load/save of the JSON collection
pub mod paths; // Data directory layout

pub use artifacts::{ArtifactCleaner, CleanupReport};
pub use history_file::{HistoryFile, LoadOutcome, LoadSource, SaveInfo};
pub use paths::{HistoryPaths, BACKUP_FILE_NAME, HISTORY_FILE_NAME, TEMP_SUFFIX};
