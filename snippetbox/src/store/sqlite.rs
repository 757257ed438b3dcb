//! SQLite snippet store

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{connect_error, SnippetStore, StoreResult};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{lifetime, now_utc, Snippet, LATEST_LIMIT};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS snippets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created DATETIME NOT NULL,
        expires DATETIME NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_snippets_created ON snippets (created)",
];

const INSERT: &str = "INSERT INTO snippets (title, content, created, expires)
    VALUES (?, ?, ?, ?)";

const GET: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > ? AND id = ?";

const LATEST: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > ?
    ORDER BY created DESC, id DESC
    LIMIT ?";

/// Snippet store over a SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteSnippetStore {
    pool: SqlitePool,
}

impl SqliteSnippetStore {
    /// Wrap an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pool from configuration and verify it with a round-trip
    ///
    /// Database files are created when missing. An in-memory database lives
    /// inside a single connection, so its pool is pinned to one connection
    /// that is never recycled.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(connect_error)?
            .create_if_missing(true);

        let pool_options = if is_in_memory(&config.url) {
            single_connection_pool()
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
        };

        let pool = pool_options
            .acquire_timeout(config.connection_timeout())
            .connect_with(options)
            .await
            .map_err(connect_error)?;

        let store = Self::new(pool);
        store.ping().await?;
        Ok(store)
    }

    /// Private in-memory database with the schema applied
    pub async fn in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(connect_error)?;
        let pool = single_connection_pool()
            .connect_with(options)
            .await
            .map_err(connect_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn single_connection_pool() -> SqlitePoolOptions {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

#[async_trait]
impl SnippetStore for SqliteSnippetStore {
    async fn insert(&self, title: &str, content: &str, expiry_days: u32) -> StoreResult<i64> {
        let (created, expires) =
            lifetime(now_utc(), expiry_days).ok_or(StoreError::InvalidExpiry(expiry_days))?;
        let result = sqlx::query(INSERT)
            .bind(title)
            .bind(content)
            .bind(created)
            .bind(expires)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get(&self, id: i64) -> StoreResult<Snippet> {
        sqlx::query_as::<_, Snippet>(GET)
            .bind(now_utc())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> StoreResult<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(LATEST)
            .bind(now_utc())
            .bind(LATEST_LIMIT as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(snippets)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Snippet schema ready (sqlite)");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
