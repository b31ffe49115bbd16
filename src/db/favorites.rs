use sqlx::SqlitePool;
use tokio::sync::{watch, Mutex};

use crate::{error::AppResult, models::FavoriteRecord};

/// Persistent set of favorite movies keyed by movie id
///
/// `observe_all` hands out a live view that is republished with the full set,
/// ordered by movie id, after every successful mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<Option<FavoriteRecord>>;

    /// Inserts the record, or updates the existing favorite with the same id in place
    async fn upsert(&self, record: &FavoriteRecord) -> AppResult<()>;

    async fn delete(&self, id: i64) -> AppResult<()>;

    fn observe_all(&self) -> watch::Receiver<Vec<FavoriteRecord>>;
}

pub struct SqliteFavoriteStore {
    pool: SqlitePool,
    snapshot: watch::Sender<Vec<FavoriteRecord>>,
    /// Serializes mutate-then-publish so snapshots go out in write order
    write_lock: Mutex<()>,
}

impl SqliteFavoriteStore {
    pub async fn new(pool: SqlitePool) -> AppResult<Self> {
        let initial = Self::load_all(&pool).await?;

        tracing::info!(favorites = initial.len(), "Loaded favorite movies");

        let (snapshot, _) = watch::channel(initial);
        Ok(Self {
            pool,
            snapshot,
            write_lock: Mutex::new(()),
        })
    }

    async fn load_all(pool: &SqlitePool) -> AppResult<Vec<FavoriteRecord>> {
        let records = sqlx::query_as::<_, FavoriteRecord>(
            r#"
            SELECT id, title, poster_url, backdrop_url, overview, release_date, primary_genre
            FROM favorite_movies
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Republishes the full set; a failed reload keeps the previous snapshot
    async fn publish(&self) {
        match Self::load_all(&self.pool).await {
            Ok(records) => {
                self.snapshot.send_replace(records);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload favorites after write");
            }
        }
    }
}

#[async_trait::async_trait]
impl FavoriteStore for SqliteFavoriteStore {
    async fn get(&self, id: i64) -> AppResult<Option<FavoriteRecord>> {
        let record = sqlx::query_as::<_, FavoriteRecord>(
            r#"
            SELECT id, title, poster_url, backdrop_url, overview, release_date, primary_genre
            FROM favorite_movies
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert(&self, record: &FavoriteRecord) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        sqlx::query(
            r#"
            INSERT INTO favorite_movies
                (id, title, poster_url, backdrop_url, overview, release_date, primary_genre)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                poster_url = excluded.poster_url,
                backdrop_url = excluded.backdrop_url,
                overview = excluded.overview,
                release_date = excluded.release_date,
                primary_genre = excluded.primary_genre
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.poster_url)
        .bind(&record.backdrop_url)
        .bind(&record.overview)
        .bind(&record.release_date)
        .bind(&record.primary_genre)
        .execute(&self.pool)
        .await?;

        tracing::debug!(movie_id = record.id, "Favorite stored");

        self.publish().await;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        sqlx::query("DELETE FROM favorite_movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(movie_id = id, "Favorite removed");

        self.publish().await;
        Ok(())
    }

    fn observe_all(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.snapshot.subscribe()
    }
}
