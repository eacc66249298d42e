//! Ordered-key persistence layer (spec §4.5, §6 file layout).
//!
//! A single WAL-mode SQLite connection per logical store stands in for
//! the spec's "ordered-key log-structured KV with range-scan indexes":
//! each store is one `(key TEXT PRIMARY KEY, value BLOB)` table, SQLite's
//! B-tree keeps keys lexicographically ordered, and `kv::scan_prefix`
//! gives the range-scan secondary indexes (`source:`, `target:`, `root:`)
//! need. All mutations that touch more than one key go through
//! `kv::batch`, which runs inside one transaction (all-or-nothing).

pub mod attractor_store;
pub mod chunk_store;
pub mod compaction;
pub mod connection;
pub mod index_store;
pub mod kv;
pub mod migrations;
pub mod neuron_store;
pub mod synapse_store;

pub use attractor_store::AttractorStore;
pub use chunk_store::ChunkStore;
pub use compaction::Compactable;
pub use connection::WriteConnection;
pub use index_store::IndexStore;
pub use neuron_store::NeuronStore;
pub use synapse_store::SynapseStore;

use nmt_core::errors::StorageError;

/// Convert a rusqlite error into the storage subsystem's error type.
pub(crate) fn to_storage_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Sqlite(e.to_string())
}
