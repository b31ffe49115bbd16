/// Remote movie catalog abstraction
///
/// Providers expose the three read-only endpoints the enrichment pipeline needs:
/// free-text search, the paginated discover feed and the full genre catalog.
/// They hold no state beyond their HTTP client and never touch local storage.
use crate::{
    error::AppResult,
    models::{Genre, MovieSummary},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search for movies by title
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>>;

    /// Fetch one page of the recommendation feed, pages start at 1
    async fn discover_movies(&self, page: u32) -> AppResult<Vec<MovieSummary>>;

    /// Fetch the complete genre catalog
    async fn movie_genres(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
