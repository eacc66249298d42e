use serde::{Deserialize, Serialize};

use crate::hashing::hash_hex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMode {
    Fixed,
    ContentDefined,
}

/// An immutable, content-addressed slice of a document's bytes. Created
/// during ingestion; keyed by `hash`, so identical byte runs across
/// different documents naturally dedup to one stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub offset: u64,
    pub data: Vec<u8>,
    pub hash: String,
    /// Low 32 bits of the rolling fingerprint at the boundary, present
    /// only for content-defined chunks (debuggability, spec §4.1).
    pub fingerprint: Option<u32>,
}

impl Chunk {
    pub fn new(index: usize, offset: u64, data: Vec<u8>, fingerprint: Option<u32>) -> Self {
        let hash = hash_hex(&data);
        Self {
            index,
            offset,
            data,
            hash,
            fingerprint,
        }
    }

    /// Recompute the hash over `data` and compare to the stored hash.
    pub fn verify(&self) -> bool {
        hash_hex(&self.data) == self.hash
    }
}
