use serde::Deserialize;

pub mod movie;
pub mod resource;

pub use movie::{EnrichedMovie, FavoriteRecord, Genre, MovieSummary, NO_GENRE_ID};
pub use resource::Resource;

// ============================================================================
// TMDB API Types
// ============================================================================

/// Page envelope returned by `/search/movie` and `/discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMoviePage {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Raw movie entry inside a TMDB page
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl From<TmdbMovie> for MovieSummary {
    fn from(movie: TmdbMovie) -> Self {
        MovieSummary {
            id: movie.id,
            title: movie.title,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            overview: movie.overview,
            release_date: movie.release_date,
            genre_ids: movie.genre_ids,
        }
    }
}

/// Response of `/genre/movie/list`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

impl From<TmdbGenre> for Genre {
    fn from(genre: TmdbGenre) -> Self {
        Genre {
            id: genre.id,
            name: genre.name,
        }
    }
}
