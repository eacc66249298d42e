//! In-memory embedding cache (spec §6: "a bounded LRU cache keyed by
//! SHA-256 of input text, default cap 1000").

use moka::sync::Cache;
use sha3::{Digest, Sha3_256};

pub struct L1Cache {
    cache: Cache<String, Vec<f32>>,
}

impl L1Cache {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    pub fn key_for(text: &str) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, value: Vec<f32>) {
        self.cache.insert(key, value);
    }

    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let cache = L1Cache::new(8);
        let key = L1Cache::key_for("hello");
        cache.insert(key.clone(), vec![1.0, 2.0]);
        assert_eq!(cache.get(&key), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn miss_returns_none() {
        let cache = L1Cache::new(8);
        assert_eq!(cache.get("missing"), None);
    }
}
