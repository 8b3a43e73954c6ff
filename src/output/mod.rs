//! Output module for writing backup files
//!
//! This module handles:
//! - Writing and reading the `;`-separated backup CSV files
//! - Exporting the Letterboxd import file
//! - Recording and printing backup statistics

mod csv_backup;
mod letterboxd;
pub mod stats;
mod traits;

pub use csv_backup::{
    dataset_file_name, list_dataset_key, read_backup_csv, read_backup_csv_from_path,
    write_backup_csv, write_backup_csv_to_path, CsvDirectory, BACKUP_DELIMITER, LETTERBOXD_FILE,
    WATCHED_DATASET,
};
pub use letterboxd::{export_letterboxd, LETTERBOXD_HEADER};
pub use stats::{print_statistics, BackupStatistics, DatasetOrigin, DatasetSummary};
pub use traits::{DatasetSink, ExportError, ExportResult};
