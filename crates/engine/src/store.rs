//! HistoryStore: the synchronized entry point to the history
//!
//! ## Design
//!
//! All state (the entry collection, the history file handle, health
//! counters) sits behind a single `parking_lot::Mutex`. Every operation,
//! reads included, takes that lock for its whole duration, and mutations
//! write the file while still holding it. Two saves can never interleave.
//!
//! ## Dispatch
//!
//! Public operations are `async` and run on Tokio's blocking pool, so the
//! calling task never waits on disk I/O. They must be awaited from inside a
//! Tokio runtime. There is no cancellation: once dispatched, an operation
//! runs to completion even if its future is dropped.
//!
//! ## Failure policy
//!
//! Storage faults never fail an operation. A failed save is logged, counted
//! in [`StoreHealth`], and the in-memory collection stays authoritative until
//! a later save succeeds. Artifact cleanup failures are logged and ignored.
//! "Not found" and blank input produce empty results or `false`.

use parking_lot::Mutex;
use snaptext_core::{Entry, HistoryError, HistoryResult};
use snaptext_durability::{ArtifactCleaner, HistoryFile, LoadSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::HistoryConfig;
use crate::export::{self, ExportFormat};
use crate::query;

/// Snapshot of the store's storage health
///
/// Purely informational: operations keep succeeding whatever this says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHealth {
    /// Where the collection was loaded from at open
    pub load_source: LoadSource,
    /// Read faults hit while loading (0, 1 or 2)
    pub load_errors: usize,
    /// Successful saves since open
    pub saves: u64,
    /// Failed saves since the last successful one
    pub consecutive_save_failures: u64,
    /// Message of the most recent save failure, cleared on success
    pub last_save_error: Option<String>,
}

impl StoreHealth {
    /// True if the last save attempt (if any) reached disk
    pub fn in_sync(&self) -> bool {
        self.consecutive_save_failures == 0
    }
}

struct StoreState {
    entries: Vec<Entry>,
    file: HistoryFile,
    cleaner: ArtifactCleaner,
    health: StoreHealth,
}

impl StoreState {
    /// Write the whole collection, recording the outcome
    fn persist(&mut self) {
        match self.file.save(&self.entries) {
            Ok(info) => {
                self.health.saves += 1;
                self.health.consecutive_save_failures = 0;
                self.health.last_save_error = None;
                debug!(
                    target: "snaptext::store",
                    path = %info.path.display(),
                    entries = info.entries,
                    bytes = info.bytes,
                    backed_up = info.backed_up,
                    "Saved history"
                );
            }
            Err(e) => {
                self.health.consecutive_save_failures += 1;
                self.health.last_save_error = Some(e.to_string());
                error!(
                    target: "snaptext::store",
                    error = %e,
                    failures = self.health.consecutive_save_failures,
                    "Failed to save history; keeping in-memory state"
                );
            }
        }
    }

    fn add(&mut self, entry: Entry) -> bool {
        if query::contains_id(&self.entries, entry.id()) {
            warn!(target: "snaptext::store", id = entry.id(), "Ignoring add of duplicate id");
            return false;
        }
        self.entries.push(entry);
        self.persist();
        true
    }

    fn update(&mut self, entry: Entry) -> bool {
        let Some(slot) = self.entries.iter_mut().find(|e| e.id() == entry.id()) else {
            return false;
        };
        *slot = entry;
        self.persist();
        true
    }

    fn delete(&mut self, id: &str) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id() == id) else {
            return false;
        };
        let removed = self.entries.remove(pos);
        self.persist();

        let report = self.cleaner.remove_for(&removed);
        if report.is_clean() {
            debug!(
                target: "snaptext::store",
                id,
                removed = report.removed,
                missing = report.missing,
                "Deleted entry"
            );
        } else {
            warn!(
                target: "snaptext::store",
                id,
                failed = report.failed.len(),
                "Deleted entry; some artifacts could not be removed"
            );
        }
        true
    }

    fn delete_all(&mut self) -> usize {
        let removed = std::mem::take(&mut self.entries);
        self.persist();

        let report = self.cleaner.remove_all(&removed);
        info!(
            target: "snaptext::store",
            entries = removed.len(),
            artifacts_removed = report.removed,
            artifacts_failed = report.failed.len(),
            "Cleared history"
        );
        removed.len()
    }
}

/// Durable, searchable history of captured entries
///
/// Cheap to clone; clones share the same state.
///
/// # Example
///
/// ```ignore
/// use snaptext_engine::{HistoryConfig, HistoryStore};
/// use snaptext_core::Entry;
///
/// let store = HistoryStore::open(HistoryConfig::new("/path/to/SnapText"))?;
/// store.add(Entry::new("hello world", "", "")).await;
/// let hits = store.search("hello").await;
/// ```
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<Mutex<StoreState>>,
    data_dir: PathBuf,
}

impl HistoryStore {
    /// Open the store, loading whatever history is on disk
    ///
    /// Fails only if the configuration is invalid or the data directory
    /// cannot be created. Unreadable history files are not errors: the
    /// backup is tried, and failing that the store starts empty.
    pub fn open(config: HistoryConfig) -> HistoryResult<Self> {
        config
            .validate()
            .map_err(|e| HistoryError::config(e.to_string()))?;

        let paths = config.paths();
        paths
            .create_directories()
            .map_err(|source| HistoryError::StorageUnavailable {
                path: paths.root().to_path_buf(),
                source,
            })?;

        let file = HistoryFile::new(paths, config.sync_writes);
        if let Err(e) = file.cleanup_temp_file() {
            warn!(target: "snaptext::store", error = %e, "Could not remove stale temporary file");
        }

        let outcome = file.load();
        let entries = drop_duplicate_ids(outcome.entries);

        info!(
            target: "snaptext::store",
            path = %config.data_dir.display(),
            entries = entries.len(),
            source = ?outcome.source,
            "History store opened"
        );

        let state = StoreState {
            entries,
            file,
            cleaner: ArtifactCleaner::new(),
            health: StoreHealth {
                load_source: outcome.source,
                load_errors: outcome.errors.len(),
                saves: 0,
                consecutive_save_failures: 0,
                last_save_error: None,
            },
        };

        Ok(HistoryStore {
            inner: Arc::new(Mutex::new(state)),
            data_dir: config.data_dir,
        })
    }

    /// Data directory this store persists to
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    // ========== Reads ==========

    /// All entries, newest first
    pub async fn get_all(&self) -> Vec<Entry> {
        self.run(|state| query::all(&state.entries)).await
    }

    /// The entry with this id, or `None`
    pub async fn get_by_id(&self, id: impl Into<String>) -> Option<Entry> {
        let id = id.into();
        self.run(move |state| query::by_id(&state.entries, &id)).await
    }

    /// Entries whose text, tags or category contain `term` (ignoring case)
    ///
    /// A blank term returns nothing.
    pub async fn search(&self, term: impl Into<String>) -> Vec<Entry> {
        let term = term.into();
        self.run(move |state| query::search(&state.entries, &term))
            .await
    }

    /// Entries tagged `tag` (ignoring case)
    pub async fn get_by_tag(&self, tag: impl Into<String>) -> Vec<Entry> {
        let tag = tag.into();
        self.run(move |state| query::by_tag(&state.entries, &tag)).await
    }

    /// Distinct tags across all entries, ascending
    pub async fn get_all_tags(&self) -> Vec<String> {
        self.run(|state| query::all_tags(&state.entries)).await
    }

    /// Number of entries
    pub async fn get_count(&self) -> usize {
        self.run(|state| query::count(&state.entries)).await
    }

    /// Storage health snapshot
    pub async fn health(&self) -> StoreHealth {
        self.run(|state| state.health.clone()).await
    }

    // ========== Writes ==========

    /// Add an entry and save
    ///
    /// Returns `false` without changing anything if the id is already taken.
    pub async fn add(&self, entry: Entry) -> bool {
        self.run(move |state| state.add(entry)).await
    }

    /// Replace the entry with the same id and save
    ///
    /// The stored entry becomes exactly `entry`. Returns `false` if no entry
    /// has this id.
    pub async fn update(&self, entry: Entry) -> bool {
        self.run(move |state| state.update(entry)).await
    }

    /// Remove an entry, save, then delete its image files
    ///
    /// Returns `false` if no entry has this id.
    pub async fn delete(&self, id: impl Into<String>) -> bool {
        let id = id.into();
        self.run(move |state| state.delete(&id)).await
    }

    /// Remove every entry, save, then delete all their image files
    ///
    /// Returns the number of entries removed.
    pub async fn delete_all(&self) -> usize {
        self.run(|state| state.delete_all()).await
    }

    // ========== Export ==========

    /// Write `entries` to `path` in the given format
    ///
    /// Runs off the store lock; `entries` is usually the result of
    /// [`get_all`](Self::get_all) or [`search`](Self::search).
    pub async fn export(
        &self,
        entries: Vec<Entry>,
        path: impl Into<PathBuf>,
        format: ExportFormat,
    ) -> bool {
        export::export_async(entries, path.into(), format).await
    }

    /// Run `op` under the store lock on the blocking pool
    async fn run<F, R>(&self, op: F) -> R
    where
        F: FnOnce(&mut StoreState) -> R + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task = tokio::task::spawn_blocking(move || {
            let mut state = inner.lock();
            op(&mut state)
        });
        match task.await {
            Ok(value) => value,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => panic!("history store task did not complete: {}", err),
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

/// Keep the first entry for each id
fn drop_duplicate_ids(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = std::collections::HashSet::new();
    let before = entries.len();
    let unique: Vec<Entry> = entries
        .into_iter()
        .filter(|e| seen.insert(e.id().to_string()))
        .collect();
    if unique.len() != before {
        warn!(
            target: "snaptext::store",
            dropped = before - unique.len(),
            "Dropped entries with duplicate ids"
        );
    }
    unique
}
