//! Core types for the SnapText history store
//!
//! This crate defines the foundational types used throughout the workspace:
//! - Entry: the captured-text record and its invariants
//! - Text helpers: case-insensitive comparison shared by tags and search
//! - Error: the history store error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod text;

pub use entry::{parse_timestamp, Entry, DEFAULT_CATEGORY};
pub use error::{HistoryError, HistoryResult};
pub use text::{contains_folded, eq_ignore_case, fold_case};
