//! In-memory repository with a fixed response delay, for controller timing tests

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;

use crate::{
    error::{AppResult, ErrorCode},
    models::{EnrichedMovie, FavoriteRecord, Resource},
    services::catalog::MovieRepository,
};

pub(crate) fn movie(id: i64, title: &str, is_favorite: bool) -> EnrichedMovie {
    EnrichedMovie {
        id,
        title: title.to_string(),
        poster_url: String::new(),
        backdrop_url: String::new(),
        overview: String::new(),
        release_date: String::new(),
        primary_genre: String::new(),
        is_favorite,
    }
}

pub(crate) fn record(id: i64, title: &str) -> FavoriteRecord {
    FavoriteRecord::from(&movie(id, title, true))
}

/// Search returns one movie titled after the query; page `n` returns ids `n1` and `n2`
pub(crate) struct FakeRepository {
    delay: Duration,
    failing_pages: HashSet<u32>,
    searches: Mutex<Vec<String>>,
    pages: Mutex<Vec<u32>>,
    favorites: watch::Sender<Vec<FavoriteRecord>>,
}

impl FakeRepository {
    pub(crate) const FAILING_QUERY: &'static str = "boom";

    pub(crate) fn new(delay: Duration) -> Self {
        let (favorites, _) = watch::channel(Vec::new());
        Self {
            delay,
            failing_pages: HashSet::new(),
            searches: Mutex::new(Vec::new()),
            pages: Mutex::new(Vec::new()),
            favorites,
        }
    }

    pub(crate) fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub(crate) fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn pages(&self) -> Vec<u32> {
        self.pages.lock().unwrap().clone()
    }

    pub(crate) fn set_favorites(&self, records: Vec<FavoriteRecord>) {
        self.favorites.send_replace(records);
    }
}

#[async_trait::async_trait]
impl MovieRepository for FakeRepository {
    async fn search_movies(&self, query: &str) -> Resource<Vec<EnrichedMovie>> {
        self.searches.lock().unwrap().push(query.to_string());
        tokio::time::sleep(self.delay).await;

        if query == Self::FAILING_QUERY {
            return Resource::Error(ErrorCode::General);
        }
        Resource::Success(vec![movie(1, query, false)])
    }

    async fn recommended_movies(&self, page: u32) -> Resource<Vec<EnrichedMovie>> {
        self.pages.lock().unwrap().push(page);
        tokio::time::sleep(self.delay).await;

        if self.failing_pages.contains(&page) {
            return Resource::Error(ErrorCode::General);
        }
        let base = i64::from(page) * 10;
        Resource::Success(vec![
            movie(base + 1, &format!("Page {} #1", page), false),
            movie(base + 2, &format!("Page {} #2", page), false),
        ])
    }

    async fn add_to_favorites(&self, _movie: &EnrichedMovie) -> AppResult<()> {
        Ok(())
    }

    async fn remove_from_favorites(&self, _movie: &EnrichedMovie) -> AppResult<()> {
        Ok(())
    }

    fn favorite_movies(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.favorites.subscribe()
    }
}
