//! The durable record of which webtoons the user wants to be notified about.
//!
//! Ids live in a single `notifications` table with one primary-key text
//! column. Every write is committed with `synchronous = FULL` before the call
//! returns.
use crate::StorageError;
use crate::webtoon;

use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone)]
pub struct Preferences {
    pool: Result<SqlitePool, StorageError>,
}

impl Preferences {
    /// Opens the store at the given path, creating the file and the table if
    /// they are missing.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Full);

        log::info!("Opening preferences: {}", path.display());

        Self::connect(options).await
    }

    /// Opens a private store that lives as long as the returned value.
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect("sqlite::memory:".parse()?).await
    }

    /// A store that could not be opened. Every call fails with the given
    /// error.
    pub fn unavailable(error: StorageError) -> Self {
        Self { pool: Err(error) }
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StorageError> {
        // In-memory databases are private to their connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let _ = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool: Ok(pool) })
    }

    pub async fn list_notified_ids(&self) -> Result<Vec<webtoon::Id>, StorageError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT id FROM notifications ORDER BY rowid
        "#,
        )
        .fetch_all(self.pool()?)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(id,)| match id.parse() {
                Ok(id) => Some(id),
                Err(error) => {
                    log::warn!("Skipping invalid notified id {id:?}: {error}");
                    None
                }
            })
            .collect())
    }

    /// Records the id. Adding an id twice is not an error.
    pub async fn add(&self, id: webtoon::Id) -> Result<(), StorageError> {
        let _ = sqlx::query(
            r#"
            INSERT OR IGNORE INTO notifications (id) VALUES (?)
        "#,
        )
        .bind(id.to_string())
        .execute(self.pool()?)
        .await?;

        log::debug!("Saved notified webtoon: {id}");

        Ok(())
    }

    /// Forgets the id. Removing an absent id is not an error.
    pub async fn remove(&self, id: webtoon::Id) -> Result<(), StorageError> {
        let _ = sqlx::query(
            r#"
            DELETE FROM notifications WHERE id = ?
        "#,
        )
        .bind(id.to_string())
        .execute(self.pool()?)
        .await?;

        log::debug!("Deleted notified webtoon: {id}");

        Ok(())
    }

    /// Closes the store. Every later call fails.
    pub async fn close(&self) {
        if let Ok(pool) = &self.pool {
            pool.close().await;
        }
    }

    fn pool(&self) -> Result<&SqlitePool, StorageError> {
        self.pool.as_ref().map_err(StorageError::clone)
    }
}
