//! Durable change journal (spec §4.6: "every mutation to a neuron,
//! synapse, or attractor is appended to a per-node, strictly monotonic
//! change journal before it is considered committed").
//!
//! Grounded on `cortex-temporal`'s `event_store` module: append/batch
//! append through a single write connection, range and entity/type
//! queries as separate index scans, and compaction as a scheduled,
//! sequence-bounded sweep rather than a background GC thread.

mod journal;

pub use journal::ChangeJournal;
