//! Letterboxd import file
//!
//! Converts a watched-movies dataset into the comma-separated format the
//! Letterboxd importer accepts.

use crate::model::ColumnBuffers;
use crate::output::traits::ExportResult;
use std::io::Write;

/// Header row of the import file
pub const LETTERBOXD_HEADER: [&str; 4] = ["Title", "Year", "Rating10", "WatchedDate"];

/// Title to export for one row
///
/// The original title wins when it is present and not blank; otherwise the
/// local title is used.
fn export_title(data: &ColumnBuffers, row: usize) -> &str {
    let original = data.value("original title", row);
    if original.trim().is_empty() {
        data.value("title", row)
    } else {
        original
    }
}

/// Writes `watched` as a Letterboxd import CSV
///
/// One row per position up to the longest column; missing values are
/// exported as empty strings. `WatchedDate` is always empty.
///
/// # Returns
///
/// The number of movie rows written.
pub fn export_letterboxd<W: Write>(watched: &ColumnBuffers, writer: W) -> ExportResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(LETTERBOXD_HEADER)?;

    let rows = watched.row_count();
    for row in 0..rows {
        wtr.write_record([
            export_title(watched, row),
            watched.value("year", row),
            watched.value("user score", row).trim(),
            "",
        ])?;
    }

    wtr.flush()?;
    Ok(rows)
}
