//! SnapText - durable, searchable history of captured text
//!
//! Each capture becomes an [`Entry`]: the extracted text, references to the
//! image and thumbnail it came from, free-form tags and a category. The
//! [`HistoryStore`] keeps the collection in memory, persists every change to
//! a JSON file with a rolling backup, and answers search and tag queries.
//!
//! # Quick Start
//!
//! ```ignore
//! use snaptext::{Entry, HistoryConfig, HistoryStore};
//!
//! let store = HistoryStore::open(HistoryConfig::new("/path/to/SnapText"))?;
//!
//! let entry = Entry::new("Meeting at 10am", "/captures/1.png", "/captures/1_thumb.png")
//!     .with_tags(["work"]);
//! store.add(entry).await;
//!
//! let hits = store.search("meeting").await;
//! ```
//!
//! # Architecture
//!
//! All reads and writes go through [`HistoryStore`]. The entry model, file
//! layer and query functions live in their own crates and are not needed
//! for normal use.

// Re-export the public API from snaptext-engine
pub use snaptext_engine::*;
