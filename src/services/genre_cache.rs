use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::PrimaryGenrePolicy,
    db::GenreStore,
    error::{AppError, AppResult},
    models::{Genre, NO_GENRE_ID},
    services::providers::CatalogProvider,
};

/// Local-first genre name resolution
///
/// Lookups go to the local genre table. A miss triggers a refresh of the whole
/// remote genre catalog, which replaces the local table. There is no expiry: once
/// an id is stored it is never fetched again.
///
/// Refreshes are single-flight. Callers record the refresh generation before
/// their lookup; a caller that finds the generation moved once it holds the gate
/// reuses the outcome of the refresh that finished in the meantime.
pub struct GenreCache {
    provider: Arc<dyn CatalogProvider>,
    store: Arc<dyn GenreStore>,
    policy: PrimaryGenrePolicy,
    generation: AtomicU64,
    /// Refresh gate, holding the outcome of the latest refresh (`None` if it failed)
    last_refresh: Mutex<Option<Arc<[Genre]>>>,
}

impl GenreCache {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        store: Arc<dyn GenreStore>,
        policy: PrimaryGenrePolicy,
    ) -> Self {
        Self {
            provider,
            store,
            policy,
            generation: AtomicU64::new(0),
            last_refresh: Mutex::new(None),
        }
    }

    pub async fn lookup(&self, id: i64) -> AppResult<Option<Genre>> {
        self.store.get(id).await
    }

    /// Fetches the full genre catalog and replaces the local table with it
    ///
    /// Joins a refresh already in flight instead of starting a second one.
    pub async fn refresh_all(&self) -> AppResult<Arc<[Genre]>> {
        let seen = self.generation.load(Ordering::Acquire);
        self.refresh_since(seen).await
    }

    async fn refresh_since(&self, seen: u64) -> AppResult<Arc<[Genre]>> {
        let mut last_refresh = self.last_refresh.lock().await;

        if self.generation.load(Ordering::Acquire) != seen {
            tracing::debug!("Reusing concurrent genre refresh");
            return last_refresh
                .clone()
                .ok_or_else(|| AppError::ExternalApi("Genre refresh failed".to_string()));
        }

        let outcome = self.fetch_and_store().await;
        *last_refresh = outcome.as_ref().ok().cloned();
        self.generation.fetch_add(1, Ordering::AcqRel);

        outcome
    }

    async fn fetch_and_store(&self) -> AppResult<Arc<[Genre]>> {
        let genres = self.provider.movie_genres().await?;
        self.store.replace_all(&genres).await?;

        tracing::info!(
            genres = genres.len(),
            provider = self.provider.name(),
            "Genre cache refreshed"
        );

        Ok(Arc::from(genres))
    }

    /// Resolves the display name for a movie's primary genre id
    ///
    /// Never fails: any lookup or refresh error degrades to an empty name.
    pub async fn primary_genre_name(&self, genre_id: i64) -> String {
        if self.policy == PrimaryGenrePolicy::MatchById && genre_id == NO_GENRE_ID {
            return String::new();
        }

        let seen = self.generation.load(Ordering::Acquire);

        match self.lookup(genre_id).await {
            Ok(Some(genre)) => return genre.name,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, genre_id = genre_id, "Genre lookup failed");
                return String::new();
            }
        }

        tracing::debug!(genre_id = genre_id, "Genre cache miss");

        match self.refresh_since(seen).await {
            Ok(genres) => self.pick_from_refresh(&genres, genre_id),
            Err(e) => {
                tracing::warn!(error = %e, genre_id = genre_id, "Genre refresh failed");
                String::new()
            }
        }
    }

    fn pick_from_refresh(&self, genres: &[Genre], genre_id: i64) -> String {
        let picked = match self.policy {
            PrimaryGenrePolicy::FirstRefreshed => genres.first(),
            PrimaryGenrePolicy::MatchById => genres.iter().find(|genre| genre.id == genre_id),
        };

        picked.map(|genre| genre.name.clone()).unwrap_or_default()
    }
}
