use crate::domain::voiceover::model::{AudioOffset, CachedVoiceover};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use sqlx::types::Json;
use std::sync::Arc;

/// Raw key-value persistence for cached voiceovers. One entry per cache id,
/// `put` is an upsert with last-writer-wins semantics; collision policy
/// lives above this layer, in the domain cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, cache_id: &str) -> AppResult<Option<CachedVoiceover>>;
    async fn put(&self, cache_id: &str, entry: &CachedVoiceover) -> AppResult<()>;
}

/// In-memory cache store for development and tests.
pub struct InMemoryCacheStore {
    entries: Cache<String, CachedVoiceover>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, cache_id: &str) -> AppResult<Option<CachedVoiceover>> {
        Ok(self.entries.get(cache_id).await)
    }

    async fn put(&self, cache_id: &str, entry: &CachedVoiceover) -> AppResult<()> {
        self.entries.insert(cache_id.to_string(), entry.clone()).await;
        Ok(())
    }
}

/// Postgres-backed cache store for production.
pub struct PostgresCacheStore {
    pool: Arc<DbPool>,
}

#[derive(sqlx::FromRow)]
struct CachedVoiceoverRow {
    language_accent_code: String,
    provider: String,
    hash_code: String,
    plaintext: String,
    voiceover_filename: String,
    audio_offsets: Json<Vec<AudioOffset>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CachedVoiceoverRow> for CachedVoiceover {
    fn from(row: CachedVoiceoverRow) -> Self {
        CachedVoiceover {
            language_accent_code: row.language_accent_code,
            provider: row.provider,
            hash_code: row.hash_code,
            plaintext: row.plaintext,
            voiceover_filename: row.voiceover_filename,
            audio_offsets: row.audio_offsets.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresCacheStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Idempotent schema bootstrap, run once at startup.
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cached_voiceovers (
                id TEXT PRIMARY KEY,
                language_accent_code TEXT NOT NULL,
                provider TEXT NOT NULL,
                hash_code TEXT NOT NULL,
                plaintext TEXT NOT NULL,
                voiceover_filename TEXT NOT NULL,
                audio_offsets JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CacheStore for PostgresCacheStore {
    async fn get(&self, cache_id: &str) -> AppResult<Option<CachedVoiceover>> {
        let row = sqlx::query_as::<_, CachedVoiceoverRow>(
            r#"
            SELECT language_accent_code, provider, hash_code, plaintext,
                   voiceover_filename, audio_offsets, created_at, updated_at
            FROM cached_voiceovers
            WHERE id = $1
            "#,
        )
        .bind(cache_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(CachedVoiceover::from))
    }

    async fn put(&self, cache_id: &str, entry: &CachedVoiceover) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cached_voiceovers
                (id, language_accent_code, provider, hash_code, plaintext,
                 voiceover_filename, audio_offsets, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                plaintext = EXCLUDED.plaintext,
                voiceover_filename = EXCLUDED.voiceover_filename,
                audio_offsets = EXCLUDED.audio_offsets,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(cache_id)
        .bind(&entry.language_accent_code)
        .bind(&entry.provider)
        .bind(&entry.hash_code)
        .bind(&entry.plaintext)
        .bind(&entry.voiceover_filename)
        .bind(Json(&entry.audio_offsets))
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_roundtrip() {
        let store = InMemoryCacheStore::new();
        let entry = CachedVoiceover::new("en-US", "polly", "Hello", "e1/audio/v.mp3", vec![]);
        let id = entry.cache_id();

        assert!(store.get(&id).await.unwrap().is_none());
        store.put(&id, &entry).await.unwrap();

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.plaintext, "Hello");
        assert_eq!(fetched.voiceover_filename, "e1/audio/v.mp3");
    }

    #[tokio::test]
    async fn test_in_memory_store_put_overwrites() {
        let store = InMemoryCacheStore::new();
        let first = CachedVoiceover::new("en-US", "polly", "Hello", "e1/audio/a.mp3", vec![]);
        let id = first.cache_id();
        store.put(&id, &first).await.unwrap();

        let mut second = first.clone();
        second.voiceover_filename = "e2/audio/b.mp3".to_string();
        store.put(&id, &second).await.unwrap();

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.voiceover_filename, "e2/audio/b.mp3");
    }
}
