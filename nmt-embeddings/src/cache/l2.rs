//! On-disk embedding cache, backed by a small rusqlite database so
//! embeddings survive process restarts (spec §6: "a second tier persists
//! cache entries across restarts").

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use nmt_core::errors::EmbeddingError;

pub struct L2SqliteCache {
    conn: Mutex<Connection>,
}

impl L2SqliteCache {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EmbeddingError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EmbeddingError::ProviderUnavailable(format!("create cache dir: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| EmbeddingError::ProviderUnavailable(format!("open cache db: {e}")))?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, EmbeddingError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init(conn: &Connection) -> Result<(), EmbeddingError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embedding_cache (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
             ) WITHOUT ROWID;",
        )
        .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<f32>>, EmbeddingError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| EmbeddingError::ProviderUnavailable("l2 cache lock poisoned".into()))?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM embedding_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .ok();
        raw.map(|s| {
            serde_json::from_str(&s)
                .map_err(|e| EmbeddingError::EncodeFailed(format!("decode cached embedding: {e}")))
        })
        .transpose()
    }

    pub fn insert(&self, key: &str, value: &[f32]) -> Result<(), EmbeddingError> {
        let encoded = serde_json::to_string(value)
            .map_err(|e| EmbeddingError::EncodeFailed(format!("encode embedding: {e}")))?;
        let conn = self
            .conn
            .lock()
            .map_err(|_| EmbeddingError::ProviderUnavailable("l2 cache lock poisoned".into()))?;
        conn.execute(
            "INSERT INTO embedding_cache (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, encoded],
        )
        .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;
        Ok(())
    }

    pub fn is_empty(&self) -> Result<bool, EmbeddingError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| EmbeddingError::ProviderUnavailable("l2 cache lock poisoned".into()))?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM embedding_cache", [], |row| row.get(0))
            .map_err(|e| EmbeddingError::ProviderUnavailable(e.to_string()))?;
        Ok(count == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let cache = L2SqliteCache::open_in_memory().unwrap();
        assert!(cache.is_empty().unwrap());
        cache.insert("k", &[1.0, 2.0, 3.0]).unwrap();
        assert!(!cache.is_empty().unwrap());
        assert_eq!(cache.get("k").unwrap(), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn survives_reopen_at_same_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.db");
        {
            let cache = L2SqliteCache::open(&path).unwrap();
            cache.insert("k", &[9.0]).unwrap();
        }
        let reopened = L2SqliteCache::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some(vec![9.0]));
    }

    #[test]
    fn miss_returns_none() {
        let cache = L2SqliteCache::open_in_memory().unwrap();
        assert_eq!(cache.get("missing").unwrap(), None);
    }
}
