use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{
    config::Config,
    db::FavoriteStore,
    error::{AppError, AppResult, ErrorCode},
    models::{EnrichedMovie, MovieSummary, Resource},
    services::genre_cache::GenreCache,
};

/// Base URLs joined with the relative image paths returned by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    pub poster_base_url: String,
    pub backdrop_base_url: String,
}

impl ImageUrls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poster_base_url: config.poster_base_url.clone(),
            backdrop_base_url: config.backdrop_base_url.clone(),
        }
    }

    fn project(&self, summary: MovieSummary, primary_genre: String, is_favorite: bool) -> EnrichedMovie {
        EnrichedMovie {
            id: summary.id,
            title: summary.title,
            poster_url: format!(
                "{}{}",
                self.poster_base_url,
                summary.poster_path.unwrap_or_default()
            ),
            backdrop_url: format!(
                "{}{}",
                self.backdrop_base_url,
                summary.backdrop_path.unwrap_or_default()
            ),
            overview: summary.overview.unwrap_or_default(),
            release_date: summary.release_date.unwrap_or_default(),
            primary_genre,
            is_favorite,
        }
    }
}

/// Turns raw remote results into display-ready movies
///
/// Every item is enriched on its own task: the primary genre name and the
/// favorite lookup run concurrently, and the batch waits for all items before
/// returning. Output order always matches input order. A single failing item
/// fails the whole batch; genre resolution itself never fails.
#[derive(Clone)]
pub struct EnrichmentPipeline {
    genre_cache: Arc<GenreCache>,
    favorites: Arc<dyn FavoriteStore>,
    image_urls: ImageUrls,
    permits: Arc<Semaphore>,
}

impl EnrichmentPipeline {
    pub fn new(
        genre_cache: Arc<GenreCache>,
        favorites: Arc<dyn FavoriteStore>,
        image_urls: ImageUrls,
        max_concurrency: usize,
    ) -> Self {
        Self {
            genre_cache,
            favorites,
            image_urls,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub async fn enrich(&self, raw: Vec<MovieSummary>) -> Resource<Vec<EnrichedMovie>> {
        match self.try_enrich(raw).await {
            Ok(movies) => Resource::Success(movies),
            Err(e) => {
                tracing::error!(error = %e, "Enrichment batch failed");
                Resource::Error(ErrorCode::from(&e))
            }
        }
    }

    /// Enriches the batch, keeping the underlying error for callers that log it
    pub async fn try_enrich(&self, raw: Vec<MovieSummary>) -> AppResult<Vec<EnrichedMovie>> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let total = raw.len();
        let mut tasks = JoinSet::new();

        for (index, summary) in raw.into_iter().enumerate() {
            let genre_cache = Arc::clone(&self.genre_cache);
            let favorites = Arc::clone(&self.favorites);
            let image_urls = self.image_urls.clone();
            let permits = Arc::clone(&self.permits);

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))?;

                let (primary_genre, favorite) = tokio::join!(
                    genre_cache.primary_genre_name(summary.primary_genre_id()),
                    favorites.get(summary.id)
                );
                let is_favorite = favorite?.is_some();

                Ok::<_, AppError>((index, image_urls.project(summary, primary_genre, is_favorite)))
            });
        }

        // Dropping the set on an early return aborts the remaining tasks
        let mut slots: Vec<Option<EnrichedMovie>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, movie) = joined
                .map_err(|e| AppError::Internal(format!("Enrichment task failed: {}", e)))??;
            slots[index] = Some(movie);
        }

        let movies = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| AppError::Internal("Enrichment task produced no result".to_string()))?;

        tracing::debug!(movies = movies.len(), "Enrichment batch completed");

        Ok(movies)
    }
}
