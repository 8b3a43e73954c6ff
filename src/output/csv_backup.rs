//! Backup CSV files
//!
//! Datasets are stored one file per dataset, `;`-separated, header row first,
//! columns in schema order. Uneven columns are right-padded with empty
//! strings on the way out.

use crate::model::ColumnBuffers;
use crate::output::letterboxd::export_letterboxd;
use crate::output::traits::{DatasetSink, ExportResult};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Field delimiter of backup files
pub const BACKUP_DELIMITER: u8 = b';';

/// Dataset key of the rating history
pub const WATCHED_DATASET: &str = "watched";

/// File name of the Letterboxd import file
pub const LETTERBOXD_FILE: &str = "letterboxd.csv";

/// Dataset key of a named list
pub fn list_dataset_key(display_name: &str) -> String {
    format!("list - {}", display_name)
}

/// File name for a dataset key
///
/// Characters that are not allowed in file names on common platforms are
/// replaced with `_`; trailing dots and spaces are dropped.
pub fn dataset_file_name(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim_end_matches(['.', ' ']).trim_start();

    if trimmed.is_empty() {
        "_.csv".to_string()
    } else {
        format!("{}.csv", trimmed)
    }
}

/// Header names used by older backups, mapped to the current schema
const LEGACY_HEADERS: &[(&str, &str)] = &[
    ("FA score", "avg score"),
    ("FA movie ID", "movie id"),
];

fn current_header(name: &str) -> &str {
    LEGACY_HEADERS
        .iter()
        .find(|&&(legacy, _)| legacy == name)
        .map_or(name, |&(_, current)| current)
}

/// Writes a buffer set as a backup CSV
///
/// A set without columns produces an empty output.
pub fn write_backup_csv<W: Write>(data: &ColumnBuffers, writer: W) -> ExportResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(BACKUP_DELIMITER)
        .from_writer(writer);

    if data.column_count() > 0 {
        wtr.write_record(data.names())?;
        for row in 0..data.row_count() {
            wtr.write_record(data.padded_row(row))?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a buffer set to `path`, creating parent directories
pub fn write_backup_csv_to_path(data: &ColumnBuffers, path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_backup_csv(data, File::create(path)?)
}

/// Reads a backup CSV back into a buffer set
///
/// Short rows are tolerated and padded with empty strings so rows stay
/// aligned; values beyond the header width are dropped.
pub fn read_backup_csv<R: Read>(reader: R) -> ExportResult<ColumnBuffers> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(BACKUP_DELIMITER)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|name| current_header(name).to_string())
        .collect();
    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in rdr.records() {
        let record = record?;
        for (index, column) in columns.iter_mut().enumerate() {
            column.push(record.get(index).unwrap_or("").to_string());
        }
    }

    let mut data = ColumnBuffers::new();
    for (name, values) in headers.iter().zip(columns) {
        data.insert_column(name, values);
    }
    Ok(data)
}

/// Reads a backup CSV from `path`
pub fn read_backup_csv_from_path(path: &Path) -> ExportResult<ColumnBuffers> {
    read_backup_csv(File::open(path)?)
}

/// A per-user backup directory holding one CSV per dataset
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(dataset_file_name(key))
    }

    /// True when a file for `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    /// Creates the directory if needed
    pub fn ensure(&self) -> ExportResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Removes the directory and everything in it, then recreates it empty
    pub fn reset(&self) -> ExportResult<()> {
        if self.root.exists() {
            tracing::debug!("Clearing previous backup in {}", self.root.display());
            std::fs::remove_dir_all(&self.root)?;
        }
        self.ensure()
    }
}

impl DatasetSink for CsvDirectory {
    fn write_dataset(&mut self, key: &str, data: &ColumnBuffers) -> ExportResult<PathBuf> {
        let path = self.path_for(key);
        write_backup_csv_to_path(data, &path)?;
        tracing::debug!("Wrote {} rows to {}", data.row_count(), path.display());
        Ok(path)
    }

    fn read_dataset(&self, key: &str) -> ExportResult<Option<ColumnBuffers>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        read_backup_csv_from_path(&path).map(Some)
    }

    fn write_letterboxd(&mut self, watched: &ColumnBuffers) -> ExportResult<PathBuf> {
        self.ensure()?;
        let path = self.root.join(LETTERBOXD_FILE);
        export_letterboxd(watched, File::create(&path)?)?;
        Ok(path)
    }
}
