//! Conflict resolution strategies, selected by `SyncConfig::conflict_strategy`
//! and dispatched through a trait object so the kernel doesn't match on
//! the strategy enum at every apply (spec §4.6 "Conflict resolution").

use chrono::{DateTime, Utc};

use nmt_core::config::sync_config::ConflictStrategy;
use nmt_core::models::ChangeEntry;

/// What to do with a remote change that collides with a local one on the
/// same entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Apply the remote change; it wins.
    AcceptRemote,
    /// Keep the local state; discard the remote change.
    KeepLocal,
    /// Neither side is applied automatically; queued for manual review.
    Pending,
}

/// Decides the outcome of a local/remote collision on the same entity.
pub trait ConflictResolver: Send + Sync {
    fn resolve(&self, local: &ChangeEntry, remote: &ChangeEntry) -> Resolution;
    fn name(&self) -> &'static str;
}

/// Picks whichever entry has the later wall-clock timestamp. Ties (equal
/// timestamps) favor local state, since an attacker or clock-skewed peer
/// should never be able to force an overwrite by tying.
pub struct LastWriteWinsResolver;

impl ConflictResolver for LastWriteWinsResolver {
    fn resolve(&self, local: &ChangeEntry, remote: &ChangeEntry) -> Resolution {
        if remote.timestamp > local.timestamp {
            Resolution::AcceptRemote
        } else {
            Resolution::KeepLocal
        }
    }

    fn name(&self) -> &'static str {
        "last-write-wins"
    }
}

/// Uses vector-clock dominance: a remote that causally follows local wins
/// outright, one that causally precedes it is discarded, and concurrent
/// writes (the genuine CRDT conflict case) fall back to timestamp order.
pub struct VectorClockResolver;

impl ConflictResolver for VectorClockResolver {
    fn resolve(&self, local: &ChangeEntry, remote: &ChangeEntry) -> Resolution {
        use nmt_core::models::vector_clock::ClockOrdering;
        match remote.vector_clock.compare(&local.vector_clock) {
            ClockOrdering::After => Resolution::AcceptRemote,
            ClockOrdering::Before | ClockOrdering::Equal => Resolution::KeepLocal,
            ClockOrdering::Concurrent => {
                if remote.timestamp > local.timestamp {
                    Resolution::AcceptRemote
                } else {
                    Resolution::KeepLocal
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "vector-clock"
    }
}

/// Never resolves automatically; every collision is queued for the
/// operator to settle through `SyncKernel::pending_conflicts`.
pub struct ManualResolver;

impl ConflictResolver for ManualResolver {
    fn resolve(&self, _local: &ChangeEntry, _remote: &ChangeEntry) -> Resolution {
        Resolution::Pending
    }

    fn name(&self) -> &'static str {
        "manual"
    }
}

pub fn resolver_for(strategy: ConflictStrategy) -> Box<dyn ConflictResolver> {
    match strategy {
        ConflictStrategy::LastWriteWins => Box::new(LastWriteWinsResolver),
        ConflictStrategy::VectorClock => Box::new(VectorClockResolver),
        ConflictStrategy::Manual => Box::new(ManualResolver),
    }
}

/// A recorded, unresolved collision awaiting manual settlement.
#[derive(Debug, Clone)]
pub struct PendingConflict {
    pub entity_type: String,
    pub entity_id: String,
    pub local: ChangeEntry,
    pub remote: ChangeEntry,
    pub detected_at: DateTime<Utc>,
}

impl PendingConflict {
    pub fn new(local: ChangeEntry, remote: ChangeEntry) -> Self {
        Self {
            entity_type: remote.entity_type.clone(),
            entity_id: remote.entity_id.clone(),
            local,
            remote,
            detected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::models::{ChangeOperation, VectorClock};

    fn entry(node: &str, clock: VectorClock, timestamp: DateTime<Utc>) -> ChangeEntry {
        ChangeEntry {
            sequence: 1,
            entity_type: "neuron".to_string(),
            operation: ChangeOperation::Update,
            entity_id: "n1".to_string(),
            data: serde_json::json!({}),
            vector_clock: clock,
            timestamp,
            node_id: node.to_string(),
            metadata: None,
        }
    }

    #[test]
    fn last_write_wins_prefers_later_timestamp() {
        let resolver = LastWriteWinsResolver;
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        let local = entry("a", VectorClock::new(), t0);
        let remote = entry("b", VectorClock::new(), t1);
        assert_eq!(resolver.resolve(&local, &remote), Resolution::AcceptRemote);
    }

    #[test]
    fn vector_clock_resolver_accepts_causally_later_remote() {
        let resolver = VectorClockResolver;
        let mut local_clock = VectorClock::new();
        local_clock.tick("a");
        let mut remote_clock = local_clock.clone();
        remote_clock.tick("b");

        let local = entry("a", local_clock, Utc::now());
        let remote = entry("b", remote_clock, Utc::now());
        assert_eq!(resolver.resolve(&local, &remote), Resolution::AcceptRemote);
    }

    #[test]
    fn vector_clock_resolver_falls_back_to_timestamp_on_concurrency() {
        let resolver = VectorClockResolver;
        let mut local_clock = VectorClock::new();
        local_clock.tick("a");
        let mut remote_clock = VectorClock::new();
        remote_clock.tick("b");

        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);
        let local = entry("a", local_clock, t0);
        let remote = entry("b", remote_clock, t1);
        assert_eq!(resolver.resolve(&local, &remote), Resolution::AcceptRemote);
    }

    #[test]
    fn manual_resolver_always_pends() {
        let resolver = ManualResolver;
        let local = entry("a", VectorClock::new(), Utc::now());
        let remote = entry("b", VectorClock::new(), Utc::now());
        assert_eq!(resolver.resolve(&local, &remote), Resolution::Pending);
    }
}
