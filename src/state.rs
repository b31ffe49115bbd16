use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    config::Config,
    controllers::{DetailController, PageEvents, PaginationController, SearchController, SearchEvents},
    db::{create_pool, FavoriteStore, GenreStore, SqliteFavoriteStore, SqliteGenreStore},
    models::EnrichedMovie,
    services::{
        CatalogProvider, EnrichmentPipeline, GenreCache, ImageUrls, MovieCatalog, MovieRepository,
        TmdbProvider,
    },
};

/// Shared application state
///
/// Built once per process; controllers receive `Arc`s of the long-lived
/// repository through it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub repository: Arc<dyn MovieRepository>,
}

impl AppState {
    /// Opens the local database and connects to TMDB
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.database_max_connections).await?;

        let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
            config.tmdb_api_token.clone(),
            config.tmdb_api_url.clone(),
            config.discover_sort_by.clone(),
        ));

        Self::with_provider(config, pool, provider).await
    }

    /// Wires the state around an already opened pool and a given catalog provider
    pub async fn with_provider(
        config: Config,
        pool: SqlitePool,
        provider: Arc<dyn CatalogProvider>,
    ) -> anyhow::Result<Self> {
        let favorites: Arc<dyn FavoriteStore> =
            Arc::new(SqliteFavoriteStore::new(pool.clone()).await?);
        let genres: Arc<dyn GenreStore> = Arc::new(SqliteGenreStore::new(pool.clone()));

        let genre_cache = Arc::new(GenreCache::new(
            Arc::clone(&provider),
            genres,
            config.primary_genre_policy,
        ));
        let pipeline = EnrichmentPipeline::new(
            genre_cache,
            Arc::clone(&favorites),
            ImageUrls::from_config(&config),
            config.enrich_concurrency,
        );
        let repository: Arc<dyn MovieRepository> = Arc::new(MovieCatalog::new(
            Arc::clone(&provider),
            pipeline,
            favorites,
        ));

        tracing::info!(
            provider = provider.name(),
            policy = ?config.primary_genre_policy,
            "Application state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            pool,
            repository,
        })
    }

    pub fn search_controller(&self) -> (SearchController, SearchEvents) {
        SearchController::new(Arc::clone(&self.repository), self.config.search_debounce())
    }

    pub fn pagination_controller(&self) -> (PaginationController, PageEvents) {
        PaginationController::new(Arc::clone(&self.repository))
    }

    pub fn detail_controller(&self, movie: EnrichedMovie) -> DetailController {
        DetailController::new(Arc::clone(&self.repository), movie)
    }

    /// Closes the database pool; controllers should be shut down first
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Application state closed");
    }
}
