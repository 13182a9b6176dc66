//! Crash-tolerant history file
//!
//! The whole collection is stored as one pretty-printed JSON array.
//!
//! # Saving
//!
//! Every save follows this pattern:
//! 1. Copy the current primary file over the backup
//! 2. Write the collection to a temporary file (`history.json.tmp`)
//! 3. fsync the temporary file
//! 4. Atomic rename over the primary file
//! 5. fsync the parent directory (Unix)
//!
//! A crash at any point leaves either the old or the new primary in place,
//! never a partial one. The backup always holds the state as of the save
//! before the last successful one.
//!
//! Step 1 is skipped while the primary is known to be unreadable (a load
//! had to fall back past it). Copying it would overwrite the backup the
//! collection was just recovered from with the corrupt file. The first
//! successful save clears that condition.
//!
//! # Loading
//!
//! Loading never fails. A missing or blank primary yields an empty
//! collection. An unreadable or malformed primary falls back to the backup,
//! and if the backup is also unusable the collection starts empty. Every
//! fault encountered along the way is reported in [`LoadOutcome::errors`].

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use snaptext_core::{Entry, HistoryError, HistoryResult};
use tracing::{debug, warn};

use crate::paths::HistoryPaths;

/// Where the in-memory collection came from at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from the primary file
    Primary,
    /// Primary was unusable; recovered from the backup file
    Backup,
    /// Nothing usable on disk; started with an empty collection
    Empty,
}

/// Result of loading the history file
#[derive(Debug)]
pub struct LoadOutcome {
    /// Loaded entries (empty when nothing could be read)
    pub entries: Vec<Entry>,
    /// Which file produced `entries`
    pub source: LoadSource,
    /// Read/parse faults encountered on the way
    pub errors: Vec<HistoryError>,
}

/// Information about a completed save
#[derive(Debug, Clone)]
pub struct SaveInfo {
    /// Number of entries written
    pub entries: usize,
    /// Size of the written file in bytes
    pub bytes: usize,
    /// Path of the primary file
    pub path: PathBuf,
    /// Whether the previous primary was copied to the backup
    pub backed_up: bool,
}

/// Reader/writer for the primary and backup history files
#[derive(Debug)]
pub struct HistoryFile {
    paths: HistoryPaths,
    sync_writes: bool,
    /// Set when the last load found the primary unreadable
    primary_corrupt: AtomicBool,
}

impl HistoryFile {
    /// Create a history file handle
    ///
    /// With `sync_writes` set, every save is fsynced before it is reported
    /// as done.
    pub fn new(paths: HistoryPaths, sync_writes: bool) -> Self {
        HistoryFile {
            paths,
            sync_writes,
            primary_corrupt: AtomicBool::new(false),
        }
    }

    /// Get the directory paths
    pub fn paths(&self) -> &HistoryPaths {
        &self.paths
    }

    /// Load the collection, falling back to the backup and then to empty
    pub fn load(&self) -> LoadOutcome {
        let primary = self.paths.primary();
        let mut errors = Vec::new();

        match read_collection(&primary) {
            Ok(Some(entries)) => {
                self.primary_corrupt.store(false, Ordering::Release);
                return LoadOutcome {
                    entries,
                    source: LoadSource::Primary,
                    errors,
                }
            }
            Ok(None) => {
                self.primary_corrupt.store(false, Ordering::Release);
                return LoadOutcome {
                    entries: Vec::new(),
                    source: LoadSource::Empty,
                    errors,
                };
            }
            Err(reason) => {
                self.primary_corrupt.store(true, Ordering::Release);
                warn!(
                    target: "snaptext::durability",
                    path = %primary.display(),
                    %reason,
                    "Primary history file unreadable, trying backup"
                );
                errors.push(HistoryError::PrimaryRead {
                    path: primary,
                    reason,
                });
            }
        }

        let backup = self.paths.backup();
        match read_collection(&backup) {
            Ok(Some(entries)) => LoadOutcome {
                entries,
                source: LoadSource::Backup,
                errors,
            },
            Ok(None) => {
                warn!(
                    target: "snaptext::durability",
                    path = %backup.display(),
                    "No usable backup, starting with empty history"
                );
                LoadOutcome {
                    entries: Vec::new(),
                    source: LoadSource::Empty,
                    errors,
                }
            }
            Err(reason) => {
                warn!(
                    target: "snaptext::durability",
                    path = %backup.display(),
                    %reason,
                    "Backup history file unreadable, starting with empty history"
                );
                errors.push(HistoryError::BackupRead {
                    path: backup,
                    reason,
                });
                LoadOutcome {
                    entries: Vec::new(),
                    source: LoadSource::Empty,
                    errors,
                }
            }
        }
    }

    /// Persist the whole collection
    ///
    /// On error the previous primary file is left untouched (or, if the
    /// failure happened after the backup copy, both files hold the previous
    /// state).
    pub fn save(&self, entries: &[Entry]) -> HistoryResult<SaveInfo> {
        let primary = self.paths.primary();
        let backup = self.paths.backup();
        let temp = self.paths.temp();

        // Step 1: Preserve the previous state, unless it is known to be garbage
        let backed_up = if self.paths.exists() && !self.primary_corrupt.load(Ordering::Acquire) {
            fs::copy(&primary, &backup).map_err(|e| HistoryError::write(&backup, e))?;
            if self.sync_writes {
                sync_file(&backup).map_err(|e| HistoryError::write(&backup, e))?;
            }
            true
        } else {
            false
        };

        // Step 2: Write to temporary file
        let json = serde_json::to_vec_pretty(entries)?;
        if let Err(e) = self.write_temp(&temp, &json) {
            let _ = fs::remove_file(&temp);
            return Err(HistoryError::write(&temp, e));
        }

        // Step 3: Atomic rename over the primary
        if let Err(e) = fs::rename(&temp, &primary) {
            let _ = fs::remove_file(&temp);
            return Err(HistoryError::write(&primary, e));
        }

        // The primary now holds a good collection
        self.primary_corrupt.store(false, Ordering::Release);

        // Step 4: fsync parent directory
        if self.sync_writes {
            sync_dir(self.paths.root()).map_err(|e| HistoryError::write(self.paths.root(), e))?;
        }

        debug!(
            target: "snaptext::durability",
            entries = entries.len(),
            bytes = json.len(),
            backed_up,
            "History saved"
        );

        Ok(SaveInfo {
            entries: entries.len(),
            bytes: json.len(),
            path: primary,
            backed_up,
        })
    }

    /// Remove a temporary file left behind by an interrupted save
    ///
    /// Returns `true` if one was found and removed.
    pub fn cleanup_temp_file(&self) -> io::Result<bool> {
        let temp = self.paths.temp();
        match fs::remove_file(&temp) {
            Ok(()) => {
                warn!(
                    target: "snaptext::durability",
                    path = %temp.display(),
                    "Removed stale temporary history file"
                );
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if a temporary file currently exists
    pub fn temp_file_exists(&self) -> bool {
        self.paths.temp().exists()
    }

    fn write_temp(&self, temp: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(temp)?;
        file.write_all(data)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// Read one history file
///
/// `Ok(None)` means there is nothing to load: the file is missing, blank, or
/// holds a JSON `null`.
fn read_collection(path: &Path) -> Result<Option<Vec<Entry>>, String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str::<Option<Vec<Entry>>>(&content).map_err(|e| e.to_string())
}

fn sync_file(path: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).open(path)?.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
