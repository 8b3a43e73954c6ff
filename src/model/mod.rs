//! Data model for scraped datasets
//!
//! This module provides the typed records produced by the page extractor and
//! the column-oriented buffers they are mapped onto at the export boundary.
//!
//! # Components
//!
//! - `MovieCard`, `ListedMovie`, `WatchedMovie`: one scraped item per kind
//! - `ListReference`: one entry of a user's collection of named lists
//! - `ColumnBuffers`: field name → ordered values, handed to the CSV exporter

mod columns;
mod movie;

// Re-export main types
pub use columns::{ColumnBuffers, Record};
pub use movie::{
    ListIndex, ListReference, ListedMovie, MovieCard, WatchedMovie, LIST_FIELDS, WATCHED_FIELDS,
};
