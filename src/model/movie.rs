/// Typed records for scraped movies and user lists
use crate::model::columns::Record;

/// Column schema of a named-list dataset
pub const LIST_FIELDS: &[&str] = &[
    "title",
    "original title",
    "year",
    "country",
    "user score",
    "avg score",
    "movie id",
    "directors",
];

/// Column schema of the watched (rated) movies dataset
pub const WATCHED_FIELDS: &[&str] = &[
    "genre",
    "title",
    "original title",
    "year",
    "country",
    "user score",
    "avg score",
    "movie id",
    "directors",
];

/// One movie card as rendered on any listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieCard {
    /// Stable item identifier (`data-movie-id`)
    pub id: String,

    /// Primary (listing-language) title, parenthetical qualifier removed
    pub title: String,

    /// Original title, empty when unknown or equal to `title`
    pub original_title: String,

    /// First non-empty year label
    pub year: String,

    /// Country name from the flag image
    pub country: String,

    /// Site-wide average score
    pub average_score: String,

    /// Directors joined with ", "
    pub directors: String,
}

/// A movie entry of a named list, with the owner's score
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListedMovie {
    pub user_score: String,
    pub card: MovieCard,
}

/// A movie from the user's rating history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedMovie {
    /// Kept for column compatibility; the site no longer groups by genre
    pub genre: String,
    pub user_score: String,
    pub card: MovieCard,
}

impl Record for ListedMovie {
    const FIELDS: &'static [&'static str] = LIST_FIELDS;

    fn values(&self) -> Vec<String> {
        let card = &self.card;
        vec![
            card.title.clone(),
            card.original_title.clone(),
            card.year.clone(),
            card.country.clone(),
            self.user_score.clone(),
            card.average_score.clone(),
            card.id.clone(),
            card.directors.clone(),
        ]
    }
}

impl Record for WatchedMovie {
    const FIELDS: &'static [&'static str] = WATCHED_FIELDS;

    fn values(&self) -> Vec<String> {
        let card = &self.card;
        vec![
            self.genre.clone(),
            card.title.clone(),
            card.original_title.clone(),
            card.year.clone(),
            card.country.clone(),
            self.user_score.clone(),
            card.average_score.clone(),
            card.id.clone(),
            card.directors.clone(),
        ]
    }
}

/// One entry in a user's collection of named lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListReference {
    pub display_name: String,
    pub target_url: String,
}

/// Insertion-ordered list references, unique by display name
///
/// A later reference with an already-seen name replaces the earlier target
/// but keeps the earlier position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListIndex {
    entries: Vec<ListReference>,
}

impl ListIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a reference; last write wins for duplicate names
    pub fn insert(&mut self, reference: ListReference) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.display_name == reference.display_name)
        {
            Some(existing) => existing.target_url = reference.target_url,
            None => self.entries.push(reference),
        }
    }

    pub fn get(&self, display_name: &str) -> Option<&ListReference> {
        self.entries
            .iter()
            .find(|entry| entry.display_name == display_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListReference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ListReference> for ListIndex {
    fn from_iter<I: IntoIterator<Item = ListReference>>(iter: I) -> Self {
        let mut index = Self::new();
        for reference in iter {
            index.insert(reference);
        }
        index
    }
}
