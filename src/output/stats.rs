//! Backup run statistics
//!
//! Collected by the backup runner while datasets are written, and printed
//! once the run completes.

use std::path::PathBuf;
use std::time::Duration;

/// How a dataset made it into the backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetOrigin {
    /// Scraped during this run
    Scraped,
    /// Reloaded from a previous, interrupted run
    Resumed,
}

/// One dataset file of a backup
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub key: String,
    pub rows: usize,
    pub path: PathBuf,
    pub origin: DatasetOrigin,
}

/// Backup run summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackupStatistics {
    /// The user that was backed up
    pub user_id: String,

    /// Every dataset written or reloaded, in processing order
    pub datasets: Vec<DatasetSummary>,

    /// Letterboxd import file, when one was requested
    pub letterboxd: Option<PathBuf>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BackupStatistics {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, key: &str, rows: usize, path: PathBuf, origin: DatasetOrigin) {
        self.datasets.push(DatasetSummary {
            key: key.to_string(),
            rows,
            path,
            origin,
        });
    }

    /// Total number of movie rows across datasets
    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(|d| d.rows).sum()
    }

    pub fn count(&self, origin: DatasetOrigin) -> usize {
        self.datasets.iter().filter(|d| d.origin == origin).count()
    }

    pub fn get(&self, key: &str) -> Option<&DatasetSummary> {
        self.datasets.iter().find(|d| d.key == key)
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &BackupStatistics) {
    println!("=== Backup Summary ({}) ===\n", stats.user_id);

    println!("Datasets:");
    for dataset in &stats.datasets {
        let marker = match dataset.origin {
            DatasetOrigin::Scraped => "",
            DatasetOrigin::Resumed => " (resumed)",
        };
        println!("  {}: {} movies{}", dataset.key, dataset.rows, marker);
    }
    println!();

    if let Some(path) = &stats.letterboxd {
        println!("Letterboxd import file: {}", path.display());
        println!();
    }

    println!(
        "Backup complete! {} files saved, {} movies in total ({:.1}s)",
        stats.datasets.len(),
        stats.total_rows(),
        stats.elapsed.as_secs_f64()
    );
}
