//! Endpoint URL construction
//!
//! Every remote resource the scraper touches is built here from the configured
//! base URL, so tests can point the whole scraper at a mock server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Listing language selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    #[default]
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(format!("invalid language '{}', use 'es' or 'en'", other)),
        }
    }
}

/// Sort order of a named list, mapped onto the site's numeric `orderby` codes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Position,
    Title,
    Year,
    #[default]
    Rating,
    AverageRating,
}

impl SortOrder {
    /// Numeric code sent as the `orderby` query parameter
    pub fn code(&self) -> u8 {
        match self {
            Self::Position => 0,
            Self::Title => 1,
            Self::Year => 2,
            Self::Rating => 3,
            Self::AverageRating => 4,
        }
    }

    /// Parses an English or Spanish sort key name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "position" | "posición" | "posicion" => Some(Self::Position),
            "title" | "título" | "titulo" => Some(Self::Title),
            "year" | "año" => Some(Self::Year),
            "rating" | "voto" => Some(Self::Rating),
            "average_rating" | "avg rating" | "nota media" => Some(Self::AverageRating),
            _ => None,
        }
    }
}

/// `orderby` code of the rating-history endpoint (grouped list view)
const RATINGS_ORDER: &str = "8";

/// Builds endpoint URLs for one site and language
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
    lang: Language,
}

impl SiteUrls {
    /// Creates a URL builder
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme and host of the catalog site, e.g. `https://www.example.com`
    /// * `lang` - Listing language
    pub fn new(base_url: &str, lang: Language) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, lang })
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    /// User-lists endpoint; without a page it doubles as the validation endpoint
    pub fn user_lists(&self, user_id: &str, page: Option<u32>) -> String {
        let mut url = self.endpoint(&format!("{}/userlists.php", self.lang));
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user_id", user_id);
            if let Some(page) = page {
                query.append_pair("p", &page.to_string());
            }
        }
        url.into()
    }

    /// Rating-history endpoint for one page
    pub fn user_ratings(&self, user_id: &str, page: u32) -> String {
        let mut url = self.endpoint(&format!("{}/userratings.php", self.lang));
        url.query_pairs_mut()
            .append_pair("user_id", user_id)
            .append_pair("p", &page.to_string())
            .append_pair("orderby", RATINGS_ORDER)
            .append_pair("chv", "list");
        url.into()
    }

    /// One page of a named list; `list_url` may be relative to the site root
    pub fn list_page(&self, list_url: &str, page: u32, order: SortOrder) -> Result<String, url::ParseError> {
        let mut url = self.base.join(list_url)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("orderby", &order.code().to_string());
        Ok(url.into())
    }

    /// Resolves a (possibly relative) link found on a page
    pub fn resolve(&self, href: &str) -> Result<String, url::ParseError> {
        self.base.join(href).map(Into::into)
    }

    /// Detail page of one movie, always in the site's authoritative language
    pub fn movie_detail(&self, movie_id: &str) -> String {
        self.endpoint(&format!("es/film{}.html", movie_id)).into()
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let full = format!("{}{}", self.base.path(), path);
        url.set_path(&full);
        url.set_query(None);
        url
    }
}
