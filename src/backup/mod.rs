//! Backup module
//!
//! Ties the scraping layer to the CSV output: one run backs up one user's
//! lists and rating history into `<data_dir>/<user_id>/`.

mod runner;

pub use runner::{check_user_id, BackupOptions, BackupOutcome, BackupRunner};

use crate::config::Config;
use crate::scrape::{Fetcher, ScrapeSettings, Scraper, SiteUrls};
use crate::VaultError;

/// Runs a complete backup
///
/// This is the main entry point for a backup. It will:
/// 1. Build the HTTP client and retry policy from the configuration
/// 2. Validate the user
/// 3. Scrape and write every list, then the rating history
/// 4. Optionally write the Letterboxd import file
///
/// # Arguments
///
/// * `config` - The effective configuration
/// * `options` - What to back up and where
/// * `confirm` - Asked a yes/no question when no lists are found
pub async fn run_backup<C>(
    config: &Config,
    options: BackupOptions,
    confirm: C,
) -> Result<BackupOutcome, VaultError>
where
    C: FnMut(&str) -> bool,
{
    let fetcher = Fetcher::from_config(&config.network)?;
    let urls = SiteUrls::new(&config.base_url, config.lang)?;
    let scraper = Scraper::new(&fetcher, urls, ScrapeSettings::from(config));

    BackupRunner::new(scraper, options, confirm).run().await
}
