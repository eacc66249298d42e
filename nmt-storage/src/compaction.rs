//! Compaction interface shared by every store, driven from
//! `nmt-scheduler`'s `CompactionScheduler` (spec §4.5).

use nmt_core::errors::StorageError;

/// A store that can run its own background maintenance (WAL checkpoint,
/// today; a future on-disk format could vacuum or rewrite here too).
pub trait Compactable {
    fn compact(&self) -> Result<(), StorageError>;
}

impl Compactable for crate::ChunkStore {
    fn compact(&self) -> Result<(), StorageError> {
        crate::ChunkStore::compact(self)
    }
}

impl Compactable for crate::NeuronStore {
    fn compact(&self) -> Result<(), StorageError> {
        crate::NeuronStore::compact(self)
    }
}

impl Compactable for crate::SynapseStore {
    fn compact(&self) -> Result<(), StorageError> {
        crate::SynapseStore::compact(self)
    }
}

impl Compactable for crate::IndexStore {
    fn compact(&self) -> Result<(), StorageError> {
        crate::IndexStore::compact(self)
    }
}

impl Compactable for crate::AttractorStore {
    fn compact(&self) -> Result<(), StorageError> {
        crate::AttractorStore::compact(self)
    }
}
