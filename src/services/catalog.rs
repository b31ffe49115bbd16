use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    db::FavoriteStore,
    error::{AppResult, ErrorCode},
    models::{EnrichedMovie, FavoriteRecord, Resource},
    services::{enrichment::EnrichmentPipeline, providers::CatalogProvider},
};

/// Movie data as seen by the controllers
///
/// Reads come back as a `Resource` with every failure already collapsed to an
/// `ErrorCode`. Favorite writes keep their `AppError` so callers can classify it.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    /// Searches the remote catalog; a blank query yields an empty success
    async fn search_movies(&self, query: &str) -> Resource<Vec<EnrichedMovie>>;

    /// One page of the recommendation feed, pages start at 1
    async fn recommended_movies(&self, page: u32) -> Resource<Vec<EnrichedMovie>>;

    async fn add_to_favorites(&self, movie: &EnrichedMovie) -> AppResult<()>;

    async fn remove_from_favorites(&self, movie: &EnrichedMovie) -> AppResult<()>;

    /// Live view of the full favorite set
    fn favorite_movies(&self) -> watch::Receiver<Vec<FavoriteRecord>>;
}

/// `MovieRepository` backed by the remote catalog, the enrichment pipeline and
/// the local favorite store
pub struct MovieCatalog {
    provider: Arc<dyn CatalogProvider>,
    pipeline: EnrichmentPipeline,
    favorites: Arc<dyn FavoriteStore>,
}

impl MovieCatalog {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        pipeline: EnrichmentPipeline,
        favorites: Arc<dyn FavoriteStore>,
    ) -> Self {
        Self {
            provider,
            pipeline,
            favorites,
        }
    }
}

#[async_trait::async_trait]
impl MovieRepository for MovieCatalog {
    async fn search_movies(&self, query: &str) -> Resource<Vec<EnrichedMovie>> {
        if query.trim().is_empty() {
            return Resource::Success(Vec::new());
        }

        match self.provider.search_movies(query).await {
            Ok(raw) => self.pipeline.enrich(raw).await,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    query = %query,
                    provider = self.provider.name(),
                    "Movie search failed"
                );
                Resource::Error(ErrorCode::from(&e))
            }
        }
    }

    async fn recommended_movies(&self, page: u32) -> Resource<Vec<EnrichedMovie>> {
        match self.provider.discover_movies(page).await {
            Ok(raw) => self.pipeline.enrich(raw).await,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    page = page,
                    provider = self.provider.name(),
                    "Recommended movies fetch failed"
                );
                Resource::Error(ErrorCode::from(&e))
            }
        }
    }

    async fn add_to_favorites(&self, movie: &EnrichedMovie) -> AppResult<()> {
        self.favorites.upsert(&FavoriteRecord::from(movie)).await?;
        tracing::info!(movie_id = movie.id, title = %movie.title, "Added to favorites");
        Ok(())
    }

    async fn remove_from_favorites(&self, movie: &EnrichedMovie) -> AppResult<()> {
        self.favorites.delete(movie.id).await?;
        tracing::info!(movie_id = movie.id, title = %movie.title, "Removed from favorites");
        Ok(())
    }

    fn favorite_movies(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.favorites.observe_all()
    }
}
