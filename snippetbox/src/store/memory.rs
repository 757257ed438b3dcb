//! In-process snippet store
//!
//! Used by handler tests as a substitute for SQL backends, and selectable with
//! the `memory:` URL for local runs without a database.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SnippetStore, StoreResult};
use crate::error::StoreError;
use crate::models::{lifetime, now_utc, Snippet, LATEST_LIMIT};

/// Snippets kept in insertion order; ids are positions + 1
#[derive(Debug, Default)]
pub struct MemorySnippetStore {
    rows: RwLock<Vec<Snippet>>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully-formed snippet, assigning the next id
    ///
    /// Timestamps are taken as given, so callers can seed expired rows.
    pub async fn push(&self, mut snippet: Snippet) -> i64 {
        let mut rows = self.rows.write().await;
        snippet.id = rows.len() as i64 + 1;
        let id = snippet.id;
        rows.push(snippet);
        id
    }

    /// Number of stored rows, live or expired
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn insert(&self, title: &str, content: &str, expiry_days: u32) -> StoreResult<i64> {
        let (created, expires) =
            lifetime(now_utc(), expiry_days).ok_or(StoreError::InvalidExpiry(expiry_days))?;
        let id = self
            .push(Snippet {
                id: 0,
                title: title.to_string(),
                content: content.to_string(),
                created,
                expires,
            })
            .await;
        Ok(id)
    }

    async fn get(&self, id: i64) -> StoreResult<Snippet> {
        let now = now_utc();
        let rows = self.rows.read().await;
        id.checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| rows.get(index))
            .filter(|snippet| snippet.is_live_at(now))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn latest(&self) -> StoreResult<Vec<Snippet>> {
        let now = now_utc();
        let rows = self.rows.read().await;
        let mut live: Vec<Snippet> = rows
            .iter()
            .filter(|snippet| snippet.is_live_at(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        live.truncate(LATEST_LIMIT);
        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn snippet(title: &str, created: DateTime<Utc>, expires: DateTime<Utc>) -> Snippet {
        Snippet {
            id: 0,
            title: title.to_string(),
            content: format!("{title} content"),
            created,
            expires,
        }
    }

    #[tokio::test]
    async fn test_insert_then_get_round_trip() {
        let store = MemorySnippetStore::new();
        let id = store.insert("O snail", "Climb Mount Fuji", 7).await.unwrap();
        assert_eq!(id, 1);

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.title, "O snail");
        assert_eq!(fetched.content, "Climb Mount Fuji");
        assert_eq!(fetched.expires - fetched.created, Duration::days(7));
    }

    #[tokio::test]
    async fn test_get_excludes_expired_rows() {
        let store = MemorySnippetStore::new();
        let now = now_utc();
        let id = store
            .push(snippet("stale", now - Duration::days(2), now - Duration::days(1)))
            .await;

        assert_eq!(store.len().await, 1);
        assert!(store.get(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_get_unknown_ids_are_not_found() {
        let store = MemorySnippetStore::new();
        store.insert("only", "one", 1).await.unwrap();

        for id in [0, -1, 2, i64::MAX, i64::MIN] {
            assert!(store.get(id).await.unwrap_err().is_not_found(), "id {id}");
        }
    }

    #[tokio::test]
    async fn test_latest_orders_newest_first_and_limits() {
        let store = MemorySnippetStore::new();
        let now = now_utc();
        for i in 0..12 {
            store
                .push(snippet(
                    &format!("s{i}"),
                    now - Duration::minutes(60 - i),
                    now + Duration::days(1),
                ))
                .await;
        }
        store
            .push(snippet("expired", now, now - Duration::seconds(1)))
            .await;

        let latest = store.latest().await.unwrap();
        assert_eq!(latest.len(), LATEST_LIMIT);
        assert_eq!(latest[0].title, "s11");
        assert_eq!(latest[9].title, "s2");
        assert!(latest.iter().all(|s| s.title != "expired"));
    }

    #[tokio::test]
    async fn test_latest_breaks_ties_by_id() {
        let store = MemorySnippetStore::new();
        let now = now_utc();
        let first = store.push(snippet("a", now, now + Duration::days(1))).await;
        let second = store.push(snippet("b", now, now + Duration::days(1))).await;

        let latest = store.latest().await.unwrap();
        assert_eq!(
            latest.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![second, first]
        );
    }

    #[tokio::test]
    async fn test_latest_on_empty_store() {
        let store = MemorySnippetStore::new();
        assert!(store.is_empty().await);
        assert!(store.latest().await.unwrap().is_empty());
    }
}
