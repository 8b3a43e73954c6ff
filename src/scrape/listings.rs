//! Listing operations: user lists, named list movies and watched movies
//!
//! Each operation runs one pagination pass and hands back an owned dataset.

use crate::config::{seconds, Config};
use crate::model::{ColumnBuffers, ListIndex, ListedMovie, MovieCard, WatchedMovie};
use crate::scrape::fetcher::Fetcher;
use crate::scrape::paginator::{PageOutcome, Paginator};
use crate::scrape::parser::{
    extract_list_movies, extract_list_title, extract_original_title, extract_user_lists,
    extract_watched_movies, PageItems,
};
use crate::scrape::urls::{Language, SiteUrls, SortOrder};
use crate::scrape::validate::validate_user;
use crate::VaultError;
use scraper::Html;
use std::time::Duration;

/// Pacing and lookup knobs of a scraping session
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSettings {
    /// Pause before every follow-up page
    pub page_delay: Duration,
    /// Pause after every original-title lookup
    pub detail_delay: Duration,
    /// Inclusive page ceiling for every listing
    pub max_page: Option<u32>,
    /// Look up original titles (only ever done for Spanish listings)
    pub fetch_original_titles: bool,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(5),
            detail_delay: Duration::from_millis(500),
            max_page: None,
            fetch_original_titles: true,
        }
    }
}

impl From<&Config> for ScrapeSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_delay: seconds(config.network.page_delay_secs),
            detail_delay: seconds(config.network.detail_delay_secs),
            max_page: config.max_pages,
            fetch_original_titles: config.fetch_original_titles,
        }
    }
}

/// Gives the enrichment step access to the card inside a listing record
trait HasCard {
    fn card_mut(&mut self) -> &mut MovieCard;
}

impl HasCard for ListedMovie {
    fn card_mut(&mut self) -> &mut MovieCard {
        &mut self.card
    }
}

impl HasCard for WatchedMovie {
    fn card_mut(&mut self) -> &mut MovieCard {
        &mut self.card
    }
}

/// One scraping session against one site and language
#[derive(Debug, Clone)]
pub struct Scraper<'a> {
    fetcher: &'a Fetcher,
    urls: SiteUrls,
    settings: ScrapeSettings,
}

impl<'a> Scraper<'a> {
    pub fn new(fetcher: &'a Fetcher, urls: SiteUrls, settings: ScrapeSettings) -> Self {
        Self {
            fetcher,
            urls,
            settings,
        }
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.urls
    }

    fn paginator(&self) -> Paginator<'a> {
        Paginator::new(self.fetcher, self.settings.page_delay, self.settings.max_page)
    }

    /// Original-title lookups only add value for Spanish listings
    fn wants_original_titles(&self) -> bool {
        self.settings.fetch_original_titles && self.urls.lang() == Language::Es
    }

    /// Checks that the user exists
    pub async fn validate_user(&self, user_id: &str) -> Result<(), VaultError> {
        validate_user(self.fetcher, &self.urls, user_id).await
    }

    /// Retrieves all public lists of a user
    ///
    /// Targets are resolved to absolute URLs. Duplicate names keep the last
    /// target seen.
    pub async fn user_lists(&self, user_id: &str) -> Result<ListIndex, VaultError> {
        let urls = &self.urls;
        let references = self
            .paginator()
            .paginate(
                |page| Ok(urls.user_lists(user_id, Some(page))),
                |page, body| {
                    let extracted = extract_user_lists(&Html::parse_document(body));
                    PageOutcome::from_extraction(page, extracted)
                },
            )
            .await?;

        let mut index = ListIndex::new();
        for mut reference in references {
            reference.target_url = urls.resolve(&reference.target_url)?;
            index.insert(reference);
        }
        Ok(index)
    }

    /// Retrieves all movies of a named list
    ///
    /// # Returns
    ///
    /// The list title (read from page 1 only, empty when absent) and the
    /// movies in list-schema columns.
    pub async fn list_movies(
        &self,
        list_url: &str,
        order: SortOrder,
    ) -> Result<(String, ColumnBuffers), VaultError> {
        let urls = &self.urls;
        let this = self;
        let mut title = String::new();

        let movies = self
            .paginator()
            .paginate_with(
                |page| Ok(urls.list_page(list_url, page, order)?),
                |page, body| {
                    let document = Html::parse_document(body);
                    if page == 1 {
                        match extract_list_title(&document) {
                            Some(found) => title = found,
                            None => tracing::warn!("List title not found on {}", list_url),
                        }
                    }
                    PageOutcome::from_extraction(page, extract_list_movies(&document))
                },
                move |items| this.fill_original_titles(items),
            )
            .await?;

        Ok((title, ColumnBuffers::from_records(&movies)))
    }

    /// Retrieves the whole rating history of a user
    pub async fn watched_movies(&self, user_id: &str) -> Result<ColumnBuffers, VaultError> {
        let urls = &self.urls;
        let this = self;

        let movies = self
            .paginator()
            .paginate_with(
                |page| Ok(urls.user_ratings(user_id, page)),
                |page, body| {
                    let extracted: Result<PageItems<WatchedMovie>, _> =
                        extract_watched_movies(&Html::parse_document(body));
                    PageOutcome::from_extraction(page, extracted)
                },
                move |items| this.fill_original_titles(items),
            )
            .await?;

        Ok(ColumnBuffers::from_records(&movies))
    }

    /// Looks up the original title of one movie, best effort
    ///
    /// Any failure (transport, status, missing markup) yields an empty string.
    pub async fn original_title(&self, movie_id: &str) -> String {
        let url = self.urls.movie_detail(movie_id);
        match self.fetcher.fetch(&url).await {
            Ok(response) if response.is_ok() => {
                extract_original_title(&Html::parse_document(&response.body))
            }
            Ok(response) => {
                tracing::debug!(
                    "No original title for {} (HTTP {})",
                    movie_id,
                    response.status_code
                );
                String::new()
            }
            Err(e) => {
                tracing::warn!("Original title lookup failed for {}: {}", movie_id, e);
                String::new()
            }
        }
    }

    async fn fill_original_titles<T: HasCard>(&self, mut items: Vec<T>) -> Vec<T> {
        if !self.wants_original_titles() {
            return items;
        }

        for item in items.iter_mut() {
            let card = item.card_mut();
            let original = self.original_title(&card.id).await;
            if !original.is_empty() && original.to_lowercase() != card.title.to_lowercase() {
                card.original_title = original;
            }
            if !self.settings.detail_delay.is_zero() {
                tokio::time::sleep(self.settings.detail_delay).await;
            }
        }

        items
    }
}
