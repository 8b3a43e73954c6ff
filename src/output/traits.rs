//! Output sink trait and error types
//!
//! This module defines the interface the backup runner writes datasets
//! through, and the errors exporters can raise.

use crate::model::ColumnBuffers;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Destination for finished datasets
///
/// Implementations receive a dataset key (`watched`, `list - <name>`) and a
/// complete buffer set, and report where the data ended up.
pub trait DatasetSink {
    /// Persists one dataset under `key`
    fn write_dataset(&mut self, key: &str, data: &ColumnBuffers) -> ExportResult<PathBuf>;

    /// Loads a dataset previously written under `key`, if there is one
    fn read_dataset(&self, key: &str) -> ExportResult<Option<ColumnBuffers>>;

    /// Writes the Letterboxd import file derived from the watched dataset
    fn write_letterboxd(&mut self, watched: &ColumnBuffers) -> ExportResult<PathBuf>;
}
