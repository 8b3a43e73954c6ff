//! HTML extractor for listing pages
//!
//! This module turns one fetched HTML document into typed records:
//! - Movie cards (identifier, titles, year, country, directors, scores)
//! - User list references
//! - The list title and original-title detail fields
//!
//! A missing listing container fails the whole page with
//! `ParseError::MissingContainer`. A missing mandatory field on one item only
//! rejects that item; optional fields degrade to empty strings.

use crate::model::{ListReference, ListedMovie, MovieCard, WatchedMovie};
use crate::ParseError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Items extracted from one page plus the items that had to be rejected
#[derive(Debug, Clone, PartialEq)]
pub struct PageItems<T> {
    pub items: Vec<T>,
    pub rejected: Vec<ParseError>,
}

impl<T> PageItems<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            rejected: Vec::new(),
        }
    }

    fn push(&mut self, item: Result<T, ParseError>) {
        match item {
            Ok(item) => self.items.push(item),
            Err(error) => self.rejected.push(error),
        }
    }

    /// True when the page held no item elements at all
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.rejected.is_empty()
    }
}

const LIST_GROUP: &str = ".fa-list-group";
const LIST_MOVIES: &str = "ul.fa-list-group";
const RATINGS_GROUP: &str = "div.user-ratings-list-resp";

/// Every selector the extractor uses, parsed once per process
struct Selectors {
    list_group: Selector,
    list_movies: Selector,
    ratings_group: Selector,
    rating_row: Selector,
    movie_card: Selector,
    movie_id: Selector,
    item: Selector,
    anchor: Selector,
    title_link: Selector,
    flag: Selector,
    average: Selector,
    year: Selector,
    director: Selector,
    user_rating: Selector,
    list_title: Selector,
    movie_info: Selector,
    term: Selector,
}

fn parse_selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::InvalidSelector { selector: css })
}

impl Selectors {
    fn build() -> Result<Self, ParseError> {
        Ok(Self {
            list_group: parse_selector(LIST_GROUP)?,
            list_movies: parse_selector(LIST_MOVIES)?,
            ratings_group: parse_selector(RATINGS_GROUP)?,
            rating_row: parse_selector("div.row.mb-4")?,
            movie_card: parse_selector("div.movie-card")?,
            movie_id: parse_selector("[data-movie-id]")?,
            item: parse_selector("li")?,
            anchor: parse_selector("a")?,
            title_link: parse_selector(".mc-title a")?,
            flag: parse_selector("img.nflag")?,
            average: parse_selector(".avg")?,
            year: parse_selector("span.mc-year")?,
            director: parse_selector(".mc-director")?,
            user_rating: parse_selector(".fa-user-rat-box")?,
            list_title: parse_selector("span.fs-5")?,
            movie_info: parse_selector("dl.movie-info")?,
            term: parse_selector("dt")?,
        })
    }
}

fn selectors() -> Result<&'static Selectors, ParseError> {
    static SELECTORS: OnceLock<Result<Selectors, ParseError>> = OnceLock::new();
    SELECTORS
        .get_or_init(Selectors::build)
        .as_ref()
        .map_err(Clone::clone)
}

fn title_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(.+?)\s*\(([^)]+)\)\s*$").ok())
        .as_ref()
}

fn aka_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\baka\b").ok())
        .as_ref()
}

/// Splits a label like `"Local Title (Qualifier)"` into its primary title
///
/// Only a single trailing, balanced parenthetical group is removed; a label
/// without one is returned unchanged (trimmed).
pub fn split_title(label: &str) -> String {
    let label = label.trim();
    match title_pattern().and_then(|pattern| pattern.captures(label)) {
        Some(captures) => captures[1].trim().to_string(),
        None => label.to_string(),
    }
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

/// Finds the item identifier on the card itself or its first descendant
fn movie_id(card: ElementRef<'_>, sel: &Selectors) -> Option<String> {
    card.value()
        .attr("data-movie-id")
        .or_else(|| {
            card.select(&sel.movie_id)
                .next()
                .and_then(|element| element.value().attr("data-movie-id"))
        })
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Extracts one movie card
///
/// Mandatory: identifier, title link, country flag. Everything else degrades
/// to an empty string. `original_title` is left empty for the enrichment step.
pub fn parse_movie_card(card: ElementRef<'_>) -> Result<MovieCard, ParseError> {
    parse_card_with(card, selectors()?)
}

fn parse_card_with(card: ElementRef<'_>, sel: &Selectors) -> Result<MovieCard, ParseError> {
    let id = movie_id(card, sel).ok_or_else(|| ParseError::MissingField {
        item: "<unknown>".to_string(),
        field: "data-movie-id",
    })?;

    let missing = |field: &'static str| ParseError::MissingField {
        item: id.clone(),
        field,
    };

    let label = first_text(card, &sel.title_link).ok_or_else(|| missing("mc-title"))?;
    let title = split_title(&label);

    let country = card
        .select(&sel.flag)
        .next()
        .and_then(|flag| flag.value().attr("alt"))
        .map(|alt| alt.trim().to_string())
        .ok_or_else(|| missing("nflag"))?;

    let average_score = first_text(card, &sel.average)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    // Keep the first non-empty year label
    let year = card
        .select(&sel.year)
        .map(text_of)
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let directors = card
        .select(&sel.director)
        .next()
        .map(|block| {
            block
                .select(&sel.anchor)
                .map(text_of)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    Ok(MovieCard {
        id,
        title,
        original_title: String::new(),
        year,
        country,
        average_score,
        directors,
    })
}

fn user_score(scope: ElementRef<'_>, sel: &Selectors) -> String {
    first_text(scope, &sel.user_rating)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Extracts the references from one page of a user's lists
pub fn extract_user_lists(document: &Html) -> Result<PageItems<ListReference>, ParseError> {
    let sel = selectors()?;
    let container = document
        .select(&sel.list_group)
        .next()
        .ok_or(ParseError::MissingContainer {
            selector: LIST_GROUP,
        })?;

    let mut page = PageItems::new();
    for entry in container.select(&sel.item) {
        let link = entry.select(&sel.anchor).find(|anchor| {
            let classes: Vec<&str> = anchor.value().classes().collect();
            classes != ["ls-imgs"]
        });

        page.push(
            link.and_then(|anchor| {
                let href = anchor.value().attr("href")?;
                Some(ListReference {
                    display_name: text_of(anchor).trim().to_string(),
                    target_url: href.trim().to_string(),
                })
            })
            .ok_or_else(|| ParseError::MissingField {
                item: "<list entry>".to_string(),
                field: "a[href]",
            }),
        );
    }

    Ok(page)
}

/// Reads the list display title (the part after the first `:`)
pub fn extract_list_title(document: &Html) -> Option<String> {
    let sel = selectors().ok()?;
    let label = document.select(&sel.list_title).next().map(text_of)?;
    let (_, title) = label.split_once(':')?;
    Some(title.trim().to_string())
}

/// Extracts the movies from one page of a named list
pub fn extract_list_movies(document: &Html) -> Result<PageItems<ListedMovie>, ParseError> {
    let sel = selectors()?;
    let container = document
        .select(&sel.list_movies)
        .next()
        .ok_or(ParseError::MissingContainer {
            selector: LIST_MOVIES,
        })?;

    let mut page = PageItems::new();
    for entry in container.select(&sel.item) {
        page.push(parse_card_with(entry, sel).map(|card| ListedMovie {
            user_score: user_score(entry, sel),
            card,
        }));
    }

    Ok(page)
}

/// Extracts the movies from one page of the rating history
pub fn extract_watched_movies(document: &Html) -> Result<PageItems<WatchedMovie>, ParseError> {
    let sel = selectors()?;
    let mut groups = document.select(&sel.ratings_group).peekable();
    if groups.peek().is_none() {
        return Err(ParseError::MissingContainer {
            selector: RATINGS_GROUP,
        });
    }

    let mut page = PageItems::new();

    for group in groups {
        for row in group.select(&sel.rating_row) {
            let card = row
                .select(&sel.movie_card)
                .next()
                .ok_or_else(|| ParseError::MissingField {
                    item: movie_id(row, sel).unwrap_or_else(|| "<unknown>".to_string()),
                    field: "movie-card",
                })
                .and_then(|card| parse_card_with(card, sel));

            page.push(card.map(|card| WatchedMovie {
                genre: String::new(),
                user_score: user_score(row, sel),
                card,
            }));
        }
    }

    Ok(page)
}

/// Reads the original title from a movie detail page
///
/// Returns an empty string when the page carries no original-title entry.
pub fn extract_original_title(document: &Html) -> String {
    let Ok(sel) = selectors() else {
        return String::new();
    };
    let Some(info) = document.select(&sel.movie_info).next() else {
        return String::new();
    };

    for term in info.select(&sel.term) {
        if !text_of(term).to_lowercase().contains("original") {
            continue;
        }

        let definition = term
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .filter(|sibling| sibling.value().name() == "dd");

        if let Some(definition) = definition {
            let text = definition
                .text()
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let title = match aka_pattern().and_then(|pattern| pattern.find(&text)) {
                Some(found) => &text[..found.start()],
                None => text.as_str(),
            };
            return title.trim().to_string();
        }
    }

    String::new()
}
