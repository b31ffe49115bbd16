use std::sync::Arc;

use tokio::sync::watch;

use crate::{error::ErrorCode, models::EnrichedMovie, services::catalog::MovieRepository};

/// Holds the movie shown on a detail screen and toggles its favorite state
pub struct DetailController {
    repository: Arc<dyn MovieRepository>,
    movie: watch::Sender<EnrichedMovie>,
}

impl DetailController {
    pub fn new(repository: Arc<dyn MovieRepository>, movie: EnrichedMovie) -> Self {
        let (movie, _) = watch::channel(movie);
        Self { repository, movie }
    }

    pub fn current(&self) -> EnrichedMovie {
        self.movie.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EnrichedMovie> {
        self.movie.subscribe()
    }

    /// Writes the opposite favorite state, then flips the held snapshot
    pub async fn toggle_favorite(&self) -> Result<(), ErrorCode> {
        let movie = self.current();

        let outcome = if movie.is_favorite {
            self.repository.remove_from_favorites(&movie).await
        } else {
            self.repository.add_to_favorites(&movie).await
        };

        if let Err(e) = outcome {
            tracing::error!(error = %e, movie_id = movie.id, "Favorite toggle failed");
            return Err(ErrorCode::FavoriteWrite);
        }

        self.movie.send_replace(movie.toggled());
        Ok(())
    }
}
