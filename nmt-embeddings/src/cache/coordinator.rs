//! Ties the L1 (in-memory) and L2 (on-disk) caches together with the
//! promotion behavior exercised by the teacher's embedding wiring tests:
//! an L2 hit is copied back into L1 so the next lookup for the same text
//! is a pure in-memory hit.

use std::path::Path;

use nmt_core::errors::EmbeddingError;

use super::l1::L1Cache;
use super::l2::L2SqliteCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHitTier {
    L1,
    L2,
    Miss,
}

pub struct CacheCoordinator {
    l1: L1Cache,
    l2: L2SqliteCache,
}

impl CacheCoordinator {
    pub fn new(capacity: u64) -> Result<Self, EmbeddingError> {
        Ok(Self {
            l1: L1Cache::new(capacity),
            l2: L2SqliteCache::open_in_memory()?,
        })
    }

    pub fn new_with_db_path(
        capacity: u64,
        path: impl AsRef<Path>,
    ) -> Result<Self, EmbeddingError> {
        Ok(Self {
            l1: L1Cache::new(capacity),
            l2: L2SqliteCache::open(path)?,
        })
    }

    /// Looks up `text`'s embedding, checking L1 first then L2. An L2 hit
    /// is promoted into L1 before returning.
    pub fn get(&self, text: &str) -> Result<(Option<Vec<f32>>, CacheHitTier), EmbeddingError> {
        let key = L1Cache::key_for(text);
        if let Some(v) = self.l1.get(&key) {
            return Ok((Some(v), CacheHitTier::L1));
        }
        if let Some(v) = self.l2.get(&key)? {
            self.l1.insert(key, v.clone());
            return Ok((Some(v), CacheHitTier::L2));
        }
        Ok((None, CacheHitTier::Miss))
    }

    pub fn put(&self, text: &str, embedding: &[f32]) -> Result<(), EmbeddingError> {
        let key = L1Cache::key_for(text);
        self.l1.insert(key.clone(), embedding.to_vec());
        self.l2.insert(&key, embedding)
    }

    pub fn is_empty(&self) -> Result<bool, EmbeddingError> {
        Ok(self.l1.is_empty() && self.l2.is_empty()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_put_then_l1_hit() {
        let coordinator = CacheCoordinator::new(16).unwrap();
        let (v, tier) = coordinator.get("hello").unwrap();
        assert_eq!(v, None);
        assert_eq!(tier, CacheHitTier::Miss);

        coordinator.put("hello", &[1.0, 2.0]).unwrap();
        let (v, tier) = coordinator.get("hello").unwrap();
        assert_eq!(v, Some(vec![1.0, 2.0]));
        assert_eq!(tier, CacheHitTier::L1);
    }

    #[test]
    fn l2_hit_promotes_to_l1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emb.db");
        let l2 = L2SqliteCache::open(&path).unwrap();
        let key = L1Cache::key_for("warm");
        l2.insert(&key, &[3.0, 4.0]).unwrap();

        let coordinator = CacheCoordinator {
            l1: L1Cache::new(16),
            l2,
        };

        let (v, tier) = coordinator.get("warm").unwrap();
        assert_eq!(v, Some(vec![3.0, 4.0]));
        assert_eq!(tier, CacheHitTier::L2);

        let (_, tier) = coordinator.get("warm").unwrap();
        assert_eq!(tier, CacheHitTier::L1);
    }
}
