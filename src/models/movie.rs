use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Genre id used for lookups when a movie carries no genre ids at all
pub const NO_GENRE_ID: i64 = 0;

/// A movie as returned by a remote search or discover call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub genre_ids: Vec<i64>,
}

impl MovieSummary {
    /// Genre id that drives primary genre resolution
    pub fn primary_genre_id(&self) -> i64 {
        self.genre_ids.first().copied().unwrap_or(NO_GENRE_ID)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl Genre {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Display-ready movie with its genre name and favorite flag attached
///
/// `is_favorite` is a snapshot taken at enrichment time; holders patch their own
/// copy after toggling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedMovie {
    pub id: i64,
    pub title: String,
    pub poster_url: String,
    pub backdrop_url: String,
    pub overview: String,
    pub release_date: String,
    pub primary_genre: String,
    pub is_favorite: bool,
}

impl EnrichedMovie {
    /// Year part of a `YYYY-MM-DD` release date
    pub fn release_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .ok()
            .map(|date| date.year())
    }

    /// Copy of this movie with the favorite flag inverted
    pub fn toggled(&self) -> Self {
        Self {
            is_favorite: !self.is_favorite,
            ..self.clone()
        }
    }
}

/// Persisted favorite; favorite by construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FavoriteRecord {
    pub id: i64,
    pub title: String,
    pub poster_url: String,
    pub backdrop_url: String,
    pub overview: String,
    pub release_date: String,
    pub primary_genre: String,
}

impl From<&EnrichedMovie> for FavoriteRecord {
    fn from(movie: &EnrichedMovie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url.clone(),
            backdrop_url: movie.backdrop_url.clone(),
            overview: movie.overview.clone(),
            release_date: movie.release_date.clone(),
            primary_genre: movie.primary_genre.clone(),
        }
    }
}

impl From<FavoriteRecord> for EnrichedMovie {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            poster_url: record.poster_url,
            backdrop_url: record.backdrop_url,
            overview: record.overview,
            release_date: record.release_date,
            primary_genre: record.primary_genre,
            is_favorite: true,
        }
    }
}
