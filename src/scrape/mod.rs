//! Scraping module for the catalog site
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with retry and backoff
//! - HTML extraction of movie cards and list references
//! - Page-by-page pagination with pacing
//! - User validation

mod fetcher;
mod listings;
mod paginator;
mod parser;
mod urls;
mod validate;

pub use fetcher::{
    build_http_client, classify_connect_error, FetchResult, Fetcher, RetryPolicy, RetryState,
};
pub use listings::{ScrapeSettings, Scraper};
pub use paginator::{PageCursor, PageOutcome, Paginator};
pub use parser::{
    extract_list_movies, extract_list_title, extract_original_title, extract_user_lists,
    extract_watched_movies, parse_movie_card, split_title, PageItems,
};
pub use urls::{Language, SiteUrls, SortOrder};
pub use validate::validate_user;
