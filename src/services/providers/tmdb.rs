/// TMDB API provider
///
/// API Flow:
/// 1. Search: /search/movie?query=... → page of movies
/// 2. Feed: /discover/movie?sort_by=...&page=N → page of movies
/// 3. Genres: /genre/movie/list → full (id, name) catalog
///
/// Requests authenticate with a bearer read-access token.
use crate::{
    error::{AppError, AppResult},
    models::{Genre, MovieSummary, TmdbGenreList, TmdbMoviePage},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::instrument;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_token: String,
    api_url: String,
    sort_by: String,
}

impl TmdbProvider {
    pub fn new(api_token: String, api_url: String, sort_by: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_token,
            api_url,
            sort_by,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.endpoint(path);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    #[instrument(skip(self))]
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSummary>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page: TmdbMoviePage = self
            .get_json("search/movie", &[("query", query.to_string())])
            .await?;

        let movies: Vec<MovieSummary> = page.results.into_iter().map(MovieSummary::from).collect();

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = self.name(),
            "Movie search completed"
        );

        Ok(movies)
    }

    #[instrument(skip(self))]
    async fn discover_movies(&self, page: u32) -> AppResult<Vec<MovieSummary>> {
        let response: TmdbMoviePage = self
            .get_json(
                "discover/movie",
                &[("sort_by", self.sort_by.clone()), ("page", page.to_string())],
            )
            .await?;

        let movies: Vec<MovieSummary> = response
            .results
            .into_iter()
            .map(MovieSummary::from)
            .collect();

        tracing::info!(
            page = page,
            results = movies.len(),
            provider = self.name(),
            "Discover page fetched"
        );

        Ok(movies)
    }

    #[instrument(skip(self))]
    async fn movie_genres(&self) -> AppResult<Vec<Genre>> {
        let list: TmdbGenreList = self.get_json("genre/movie/list", &[]).await?;
        let genres: Vec<Genre> = list.genres.into_iter().map(Genre::from).collect();

        tracing::info!(
            genres = genres.len(),
            provider = self.name(),
            "Genre catalog fetched"
        );

        Ok(genres)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
