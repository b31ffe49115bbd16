use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{emit, EVENT_BUFFER};
use crate::{
    error::ErrorCode,
    models::{EnrichedMovie, Resource},
    services::catalog::MovieRepository,
};

/// One-shot notifications emitted by a [`SearchController`]
pub struct SearchEvents {
    pub errors: mpsc::Receiver<ErrorCode>,
}

/// Debounced movie search
///
/// Every submitted query restarts the quiet period. Once input settles, the
/// latest query is searched; a newer query arriving mid-search drops the stale
/// search so only the latest result is ever published. Re-submitting the
/// current query is ignored. `results` only moves on success; search failures
/// go to [`SearchEvents::errors`].
pub struct SearchController {
    repository: Arc<dyn MovieRepository>,
    query: watch::Sender<String>,
    results: Arc<watch::Sender<Vec<EnrichedMovie>>>,
    driver: JoinHandle<()>,
}

impl SearchController {
    pub fn new(repository: Arc<dyn MovieRepository>, debounce: Duration) -> (Self, SearchEvents) {
        let (query, query_rx) = watch::channel(String::new());
        let (results, _) = watch::channel(Vec::new());
        let results = Arc::new(results);
        let (errors, errors_rx) = mpsc::channel(EVENT_BUFFER);

        let driver = tokio::spawn(Self::search_loop(
            Arc::clone(&repository),
            query_rx,
            Arc::clone(&results),
            errors,
            debounce,
        ));

        let controller = Self {
            repository,
            query,
            results,
            driver,
        };

        (controller, SearchEvents { errors: errors_rx })
    }

    /// Replaces the current query and restarts the debounce window
    ///
    /// Submitting the text already held is a no-op.
    pub fn submit_query(&self, text: impl Into<String>) {
        let text = text.into();
        self.query.send_if_modified(|query| {
            if *query == text {
                false
            } else {
                *query = text;
                true
            }
        });
    }

    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    pub fn results(&self) -> watch::Receiver<Vec<EnrichedMovie>> {
        self.results.subscribe()
    }

    /// Adds or removes `movie` from favorites and patches the published results
    ///
    /// The results are only patched once the write succeeded. A failed write is
    /// reported through the returned code only.
    pub async fn toggle_favorite(&self, movie: &EnrichedMovie) -> Result<(), ErrorCode> {
        let outcome = if movie.is_favorite {
            self.repository.remove_from_favorites(movie).await
        } else {
            self.repository.add_to_favorites(movie).await
        };

        if let Err(e) = outcome {
            tracing::error!(error = %e, movie_id = movie.id, "Favorite toggle failed");
            return Err(ErrorCode::FavoriteWrite);
        }

        let now_favorite = !movie.is_favorite;
        self.results.send_modify(|movies| {
            for entry in movies.iter_mut().filter(|entry| entry.id == movie.id) {
                entry.is_favorite = now_favorite;
            }
        });

        Ok(())
    }

    /// Stops the search loop, dropping any search in flight
    pub async fn shutdown(self) {
        let Self { query, driver, .. } = self;
        drop(query);
        if let Err(e) = driver.await {
            tracing::error!(error = %e, "Search loop ended abnormally");
        }
    }

    async fn search_loop(
        repository: Arc<dyn MovieRepository>,
        mut query_rx: watch::Receiver<String>,
        results: Arc<watch::Sender<Vec<EnrichedMovie>>>,
        errors: mpsc::Sender<ErrorCode>,
        debounce: Duration,
    ) {
        // Set when a newer query already arrived and must be handled without waiting
        let mut superseded = false;

        loop {
            if !superseded && query_rx.changed().await.is_err() {
                break;
            }
            superseded = false;

            loop {
                tokio::select! {
                    changed = query_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = tokio::time::sleep(debounce) => break,
                }
            }

            let query = query_rx.borrow_and_update().clone();

            if query.trim().is_empty() {
                results.send_replace(Vec::new());
                continue;
            }

            tokio::select! {
                changed = query_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    tracing::debug!(query = %query, "Search superseded by newer query");
                    superseded = true;
                }
                resource = repository.search_movies(&query) => {
                    Self::publish(&query, resource, &results, &errors);
                }
            }
        }

        tracing::debug!("Search loop stopped");
    }

    fn publish(
        query: &str,
        resource: Resource<Vec<EnrichedMovie>>,
        results: &watch::Sender<Vec<EnrichedMovie>>,
        errors: &mpsc::Sender<ErrorCode>,
    ) {
        match resource {
            Resource::Success(movies) => {
                tracing::debug!(query = %query, results = movies.len(), "Search results published");
                results.send_replace(movies);
            }
            Resource::Error(code) => {
                tracing::warn!(query = %query, "Search failed");
                emit(errors, code, "search_errors");
            }
            Resource::Loading => {}
        }
    }
}
