use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database URL holding favorites and cached genres
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// TMDB v4 read access token, sent as a bearer token
    pub tmdb_api_token: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with the poster path fragment returned by the API
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Prefix joined with the backdrop path fragment returned by the API
    #[serde(default = "default_backdrop_base_url")]
    pub backdrop_base_url: String,

    /// Sort key for the recommendation feed
    #[serde(default = "default_discover_sort_by")]
    pub discover_sort_by: String,

    /// Quiet period before a typed query is searched
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Upper bound on concurrently enriched items per batch
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,

    #[serde(default)]
    pub primary_genre_policy: PrimaryGenrePolicy,
}

/// How a movie's primary genre name is picked after a cache miss
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGenrePolicy {
    /// Use the first genre of the refreshed catalog, whatever the movie's genre id
    #[default]
    FirstRefreshed,
    /// Use the refreshed genre whose id matches the movie's first genre id
    MatchById,
}

fn default_database_url() -> String {
    "sqlite://cinefeed.db".to_string()
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_backdrop_base_url() -> String {
    "https://image.tmdb.org/t/p/w780".to_string()
}

fn default_discover_sort_by() -> String {
    "popularity.desc".to_string()
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_enrich_concurrency() -> usize {
    16
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Builds a configuration with every default and the given API token
    pub fn with_token(tmdb_api_token: impl Into<String>) -> Self {
        Self {
            database_url: default_database_url(),
            database_max_connections: default_database_max_connections(),
            tmdb_api_token: tmdb_api_token.into(),
            tmdb_api_url: default_tmdb_api_url(),
            poster_base_url: default_poster_base_url(),
            backdrop_base_url: default_backdrop_base_url(),
            discover_sort_by: default_discover_sort_by(),
            search_debounce_ms: default_search_debounce_ms(),
            enrich_concurrency: default_enrich_concurrency(),
            primary_genre_policy: PrimaryGenrePolicy::default(),
        }
    }

    pub fn search_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_pairs(&[("TMDB_API_TOKEN", "token")]).unwrap();
        assert_eq!(config.tmdb_api_token, "token");
        assert_eq!(config.database_url, "sqlite://cinefeed.db");
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.discover_sort_by, "popularity.desc");
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.enrich_concurrency, 16);
        assert_eq!(config.primary_genre_policy, PrimaryGenrePolicy::FirstRefreshed);
    }

    #[test]
    fn test_missing_token_is_rejected() {
        assert!(from_pairs(&[]).is_err());
    }

    #[test]
    fn test_primary_genre_policy_parsing() {
        let config = from_pairs(&[
            ("TMDB_API_TOKEN", "token"),
            ("PRIMARY_GENRE_POLICY", "match_by_id"),
        ])
        .unwrap();
        assert_eq!(config.primary_genre_policy, PrimaryGenrePolicy::MatchById);
    }

    #[test]
    fn test_with_token_matches_env_defaults() {
        let config = Config::with_token("abc");
        assert_eq!(config.poster_base_url, "https://image.tmdb.org/t/p/w500");
        assert_eq!(config.backdrop_base_url, "https://image.tmdb.org/t/p/w780");
        assert_eq!(config.search_debounce(), std::time::Duration::from_millis(300));
    }
}
