//! Backup runner - end-to-end orchestration of one user's backup
//!
//! This module drives the whole backup:
//! - Validating the user
//! - Collecting the user's public lists and their movies
//! - Collecting the rating history
//! - Writing every dataset as soon as it is complete
//! - Checkpointing progress so an interrupted run can be resumed

use crate::model::{ColumnBuffers, ListReference};
use crate::output::{
    dataset_file_name, list_dataset_key, BackupStatistics, CsvDirectory, DatasetOrigin,
    DatasetSink, WATCHED_DATASET,
};
use crate::scrape::{Scraper, SortOrder};
use crate::session::Session;
use crate::VaultError;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

/// What to back up and where
#[derive(Debug, Clone, PartialEq)]
pub struct BackupOptions {
    pub user_id: String,
    /// Parent of the per-user directory
    pub data_dir: PathBuf,
    /// Only back up the rating history
    pub skip_lists: bool,
    /// Reuse datasets recorded by an interrupted run
    pub resume: bool,
    /// Sort order requested for list pages
    pub order: SortOrder,
    /// Also write `letterboxd.csv`
    pub letterboxd: bool,
}

impl BackupOptions {
    pub fn new(user_id: &str, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_id: user_id.to_string(),
            data_dir: data_dir.into(),
            skip_lists: false,
            resume: false,
            order: SortOrder::default(),
            letterboxd: false,
        }
    }

    /// `<data_dir>/<user_id>`
    pub fn user_dir(&self) -> PathBuf {
        self.data_dir.join(&self.user_id)
    }
}

/// Rejects user IDs that are not plain numbers
///
/// The ID names the per-user directory that a fresh run clears, so it must
/// never be a path of its own.
pub fn check_user_id(user_id: &str) -> Result<(), VaultError> {
    if !user_id.is_empty() && user_id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(VaultError::InvalidUserId {
            user_id: user_id.to_string(),
        })
    }
}

/// Dataset keys for the given lists, in order
///
/// Names that map to the same file name (compared case-insensitively) get a
/// ` (2)`, ` (3)`, ... suffix so no list overwrites another.
pub fn list_dataset_keys(lists: &[ListReference]) -> Vec<String> {
    let mut taken = HashSet::new();
    taken.insert(dataset_file_name(WATCHED_DATASET).to_lowercase());

    lists
        .iter()
        .map(|reference| {
            let base = list_dataset_key(&reference.display_name);
            let mut key = base.clone();
            let mut suffix = 2;
            while !taken.insert(dataset_file_name(&key).to_lowercase()) {
                key = format!("{} ({})", base, suffix);
                suffix += 1;
            }
            if key != base {
                tracing::warn!("List '{}' is saved as '{}'", reference.display_name, key);
            }
            key
        })
        .collect()
}

/// How a backup run ended
#[derive(Debug, Clone, PartialEq)]
pub enum BackupOutcome {
    Completed(BackupStatistics),
    /// The user declined to continue when no lists were found
    Aborted,
}

/// Main backup runner structure
pub struct BackupRunner<'a, C> {
    scraper: Scraper<'a>,
    options: BackupOptions,
    confirm: C,
}

impl<'a, C> BackupRunner<'a, C>
where
    C: FnMut(&str) -> bool,
{
    /// Creates a runner
    ///
    /// # Arguments
    ///
    /// * `scraper` - Scraping session for the target site
    /// * `options` - What to back up and where
    /// * `confirm` - Asked a yes/no question when no lists are found
    pub fn new(scraper: Scraper<'a>, options: BackupOptions, confirm: C) -> Self {
        Self {
            scraper,
            options,
            confirm,
        }
    }

    pub fn options(&self) -> &BackupOptions {
        &self.options
    }

    /// Runs the backup
    ///
    /// # Returns
    ///
    /// * `Ok(BackupOutcome::Completed)` - Every dataset was written
    /// * `Ok(BackupOutcome::Aborted)` - The user declined to continue
    /// * `Err(VaultError)` - Validation, scraping or writing failed; datasets
    ///   written so far stay on disk and the checkpoint allows `--resume`
    pub async fn run(&mut self) -> Result<BackupOutcome, VaultError> {
        let started = Instant::now();
        check_user_id(&self.options.user_id)?;
        let user_id = self.options.user_id.clone();
        let user_dir = self.options.user_dir();
        let target = user_dir.display().to_string();

        let mut sink = CsvDirectory::new(&user_dir);
        let mut session = Session::in_dir(&user_dir);
        let mut stats = BackupStatistics::new(&user_id);

        let resuming = self.options.resume && session.load() && session.is_resumable(&target);
        if self.options.resume && !resuming {
            tracing::warn!("No resumable session for {}, starting over", target);
        }
        if resuming {
            tracing::info!("Resuming previous session\n{}", session.resume_info());
        }

        self.scraper.validate_user(&user_id).await?;

        let lists: Vec<ListReference> = if self.options.skip_lists {
            tracing::info!("Skipping user lists");
            Vec::new()
        } else {
            tracing::info!("Retrieving user lists");
            let index = self.scraper.user_lists(&user_id).await?;
            if index.is_empty() {
                tracing::warn!(
                    "No lists were found. Make sure your lists are public to back them up."
                );
                if !(self.confirm)(
                    "Do you want to continue with watched movies and erase previous list data (if any)?",
                ) {
                    return Ok(BackupOutcome::Aborted);
                }
            }
            index.iter().cloned().collect()
        };

        if !resuming {
            sink.reset()?;
            session.begin(&target);
        }

        for (reference, key) in lists.iter().zip(list_dataset_keys(&lists)) {
            if let Some(data) = Self::reuse(&sink, &session, resuming, &key) {
                stats.record(&key, data.row_count(), sink.path_for(&key), DatasetOrigin::Resumed);
                continue;
            }

            tracing::info!("Parsing list: {}", reference.display_name);
            let (_, data) = self
                .scraper
                .list_movies(&reference.target_url, self.options.order)
                .await?;
            Self::store(&mut sink, &mut session, &mut stats, &key, &data)?;
        }

        let watched = match Self::reuse(&sink, &session, resuming, WATCHED_DATASET) {
            Some(data) => {
                stats.record(
                    WATCHED_DATASET,
                    data.row_count(),
                    sink.path_for(WATCHED_DATASET),
                    DatasetOrigin::Resumed,
                );
                data
            }
            None => {
                tracing::info!("Parsing watched movies");
                let data = self.scraper.watched_movies(&user_id).await?;
                Self::store(&mut sink, &mut session, &mut stats, WATCHED_DATASET, &data)?;
                data
            }
        };

        if self.options.letterboxd {
            let path = sink.write_letterboxd(&watched)?;
            tracing::info!("Letterboxd import file written to {}", path.display());
            stats.letterboxd = Some(path);
        }

        session.clear()?;
        stats.elapsed = started.elapsed();
        tracing::info!(
            "Saved {} CSV files to {}",
            stats.datasets.len(),
            user_dir.display()
        );
        Ok(BackupOutcome::Completed(stats))
    }

    /// Loads a dataset finished by a previous run, if it can be reused
    fn reuse(
        sink: &CsvDirectory,
        session: &Session,
        resuming: bool,
        key: &str,
    ) -> Option<ColumnBuffers> {
        if !resuming || !session.is_processed(key) {
            return None;
        }
        match sink.read_dataset(key) {
            Ok(Some(data)) => {
                tracing::info!("Skipping {} (already downloaded)", key);
                Some(data)
            }
            Ok(None) => {
                tracing::warn!("{} is recorded as done but its file is missing", key);
                None
            }
            Err(e) => {
                tracing::warn!("Could not reload {}: {}", key, e);
                None
            }
        }
    }

    /// Writes a finished dataset and records it in the checkpoint
    fn store(
        sink: &mut CsvDirectory,
        session: &mut Session,
        stats: &mut BackupStatistics,
        key: &str,
        data: &ColumnBuffers,
    ) -> Result<(), VaultError> {
        let path = sink.write_dataset(key, data)?;
        let rows = data.row_count();

        if !session.is_processed(key) {
            let index = session.state.current_index + 1;
            session.mark_processed(key, index);
        }
        session.state.stats.insert(key.to_string(), rows as u64);
        session.save()?;

        stats.record(key, rows, path, DatasetOrigin::Scraped);
        Ok(())
    }
}
