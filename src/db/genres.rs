use sqlx::SqlitePool;

use crate::{error::AppResult, models::Genre};

/// Local genre table backing genre resolution
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenreStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<Genre>>;

    /// Replaces the whole table with `genres`, or leaves it untouched on failure
    async fn replace_all(&self, genres: &[Genre]) -> AppResult<()>;

    async fn all(&self) -> AppResult<Vec<Genre>>;
}

pub struct SqliteGenreStore {
    pool: SqlitePool,
}

impl SqliteGenreStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl GenreStore for SqliteGenreStore {
    async fn get(&self, id: i64) -> AppResult<Option<Genre>> {
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(genre)
    }

    async fn replace_all(&self, genres: &[Genre]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM genres").execute(&mut *tx).await?;

        for genre in genres {
            sqlx::query("INSERT OR REPLACE INTO genres (id, name) VALUES (?, ?)")
                .bind(genre.id)
                .bind(&genre.name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(genres = genres.len(), "Genre table replaced");

        Ok(())
    }

    async fn all(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(genres)
    }
}
