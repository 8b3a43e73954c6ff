//! Pagination driver
//!
//! Walks a paginated listing page by page through the fetcher and a page
//! parser, accumulating items in page-ascending, then document, order.
//!
//! # State machine
//!
//! ```text
//! Fetching(1) ──200──▶ Parsing(1) ──Continue──▶ Fetching(2) ──▶ ...
//!     │                   │
//!     │ non-200,          │ End (empty page)      ──▶ Done
//!     │ page > max_page   │ Fatal(ParseError)     ──▶ Failed
//!     ▼
//!   Done
//! ```
//!
//! A short or interrupted result is not an error; only a structural failure
//! or a transport failure ends the run with `Err`.

use crate::scrape::fetcher::Fetcher;
use crate::scrape::parser::PageItems;
use crate::{ParseError, VaultError};
use std::future::Future;
use std::time::Duration;

/// What the driver should do with a parsed page
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    /// Append these items and move on to the next page
    Continue(Vec<T>),
    /// Normal end of data
    End,
    /// The page layout is broken; abort the run
    Fatal(ParseError),
}

impl<T> PageOutcome<T> {
    /// Maps an extraction result onto a driver outcome
    ///
    /// A container without any item element ends the run. Rejected items are
    /// reported and dropped; the page itself still counts.
    pub fn from_extraction(page: u32, extracted: Result<PageItems<T>, ParseError>) -> Self {
        match extracted {
            Err(error) => Self::Fatal(error),
            Ok(items) if items.is_empty() => Self::End,
            Ok(PageItems { items, rejected }) => {
                for error in &rejected {
                    tracing::warn!("Skipping item on page {}: {}", page, error);
                }
                Self::Continue(items)
            }
        }
    }
}

/// Position within one pagination run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page_number: u32,
    pub exhausted: bool,
}

impl PageCursor {
    pub fn new() -> Self {
        Self {
            page_number: 1,
            exhausted: false,
        }
    }

    /// True when `max_page` is set and the cursor has moved past it
    pub fn beyond(&self, max_page: Option<u32>) -> bool {
        max_page.is_some_and(|max| self.page_number > max)
    }

    pub fn advance(&mut self) {
        self.page_number += 1;
    }

    pub fn finish(&mut self) {
        self.exhausted = true;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one paginated listing at a time
#[derive(Debug, Clone)]
pub struct Paginator<'a> {
    fetcher: &'a Fetcher,
    page_delay: Duration,
    max_page: Option<u32>,
}

impl<'a> Paginator<'a> {
    /// Creates a driver
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The transport retry layer
    /// * `page_delay` - Pause before each follow-up page request
    /// * `max_page` - Optional page ceiling (inclusive)
    pub fn new(fetcher: &'a Fetcher, page_delay: Duration, max_page: Option<u32>) -> Self {
        Self {
            fetcher,
            page_delay,
            max_page,
        }
    }

    pub fn fetcher(&self) -> &'a Fetcher {
        self.fetcher
    }

    /// Collects every item of a listing
    ///
    /// # Arguments
    ///
    /// * `build_url` - Page number → page URL
    /// * `parse` - Page number and body → outcome
    pub async fn paginate<T, B, P>(&self, build_url: B, parse: P) -> Result<Vec<T>, VaultError>
    where
        B: FnMut(u32) -> Result<String, VaultError>,
        P: FnMut(u32, &str) -> PageOutcome<T>,
    {
        self.paginate_with(build_url, parse, |items| std::future::ready(items))
            .await
    }

    /// Collects every item of a listing, passing each page's items through
    /// `enrich` before they are appended
    ///
    /// `enrich` runs between parsing a page and requesting the next one, so
    /// any extra requests it makes are paced by the same loop.
    pub async fn paginate_with<T, R, B, P, E, F>(
        &self,
        mut build_url: B,
        mut parse: P,
        mut enrich: E,
    ) -> Result<Vec<R>, VaultError>
    where
        B: FnMut(u32) -> Result<String, VaultError>,
        P: FnMut(u32, &str) -> PageOutcome<T>,
        E: FnMut(Vec<T>) -> F,
        F: Future<Output = Vec<R>>,
    {
        let mut cursor = PageCursor::new();
        let mut collected = Vec::new();

        while !cursor.exhausted {
            if cursor.beyond(self.max_page) {
                tracing::debug!("Reached page ceiling {:?}", self.max_page);
                cursor.finish();
                break;
            }

            let url = build_url(cursor.page_number)?;
            let response = self.fetcher.fetch(&url).await?;

            if !response.is_ok() {
                tracing::debug!(
                    "Page {} returned HTTP {}, end of listing",
                    cursor.page_number,
                    response.status_code
                );
                cursor.finish();
                break;
            }

            tracing::info!("Parsing page {}", cursor.page_number);

            match parse(cursor.page_number, &response.body) {
                PageOutcome::Continue(items) => {
                    let items = enrich(items).await;
                    collected.extend(items);
                }
                PageOutcome::End => {
                    tracing::debug!("Page {} is empty, end of listing", cursor.page_number);
                    cursor.finish();
                    break;
                }
                PageOutcome::Fatal(source) => {
                    return Err(VaultError::Structural { url, source });
                }
            }

            cursor.advance();
            if !cursor.beyond(self.max_page) && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(collected)
    }
}
