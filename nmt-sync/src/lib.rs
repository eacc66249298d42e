//! CRDT-style synchronization kernel (spec §4.6): vector clocks already
//! live in `nmt_core::models::vector_clock`; this crate adds the
//! conflict-resolution strategies and the kernel that drives
//! `computeStateDiff` / `applyRemoteChanges` over the change journal.
//!
//! Grounded on `cortex-crdt`'s CRDT module: a trait-object resolver
//! selected once at construction, a durable journal as the sync log, and
//! peer watermarks tracked separately from the journal itself.

mod kernel;
mod peer;
mod resolver;

pub use kernel::{ApplyReport, StateDiff, SyncKernel, SyncStatus};
pub use peer::PeerState;
pub use resolver::{
    resolver_for, ConflictResolver, LastWriteWinsResolver, ManualResolver, PendingConflict,
    Resolution, VectorClockResolver,
};
