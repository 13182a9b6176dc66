//! History engine for SnapText
//!
//! This crate ties the lower layers together:
//! - Configuration: where the history lives and how it is written
//! - Query: search, tag lookup and listing over the collection
//! - Store: the synchronized, async entry point that owns the collection
//! - Export: CSV, text and JSON renderings of entry lists
//!
//! The store is the only component that touches the history files; the
//! query layer works purely on in-memory slices.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod export;
pub mod query;
pub mod store;

pub use config::{ConfigError, HistoryConfig, CONFIG_FILE_NAME};
pub use export::{
    default_file_name, export_by_extension, export_to_path, ExportError, ExportFormat,
};
pub use store::{HistoryStore, StoreHealth};

pub use snaptext_core::{Entry, HistoryError, HistoryResult, DEFAULT_CATEGORY};
pub use snaptext_durability::LoadSource;
