//! PostgreSQL snippet store

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{connect_error, SnippetStore, StoreResult};
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{lifetime, now_utc, Snippet, LATEST_LIMIT};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS snippets (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created TIMESTAMPTZ NOT NULL,
        expires TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_snippets_created ON snippets (created)",
];

const INSERT: &str = "INSERT INTO snippets (title, content, created, expires)
    VALUES ($1, $2, $3, $4)
    RETURNING id";

const GET: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > $1 AND id = $2";

const LATEST: &str = "SELECT id, title, content, created, expires FROM snippets
    WHERE expires > $1
    ORDER BY created DESC, id DESC
    LIMIT $2";

/// Snippet store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgSnippetStore {
    pool: PgPool,
}

impl PgSnippetStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pool from configuration and verify it with a round-trip
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connection_timeout())
            .connect(&config.url)
            .await
            .map_err(connect_error)?;

        let store = Self::new(pool);
        store.ping().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SnippetStore for PgSnippetStore {
    async fn insert(&self, title: &str, content: &str, expiry_days: u32) -> StoreResult<i64> {
        let (created, expires) =
            lifetime(now_utc(), expiry_days).ok_or(StoreError::InvalidExpiry(expiry_days))?;
        let id = sqlx::query_scalar::<_, i64>(INSERT)
            .bind(title)
            .bind(content)
            .bind(created)
            .bind(expires)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
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
        tracing::info!("Snippet schema ready (postgres)");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
