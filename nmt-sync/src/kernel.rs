//! CRDT-style synchronization kernel: computes state diffs against the
//! durable change journal, applies remote change sets against local
//! stores, and resolves collisions through a pluggable `ConflictResolver`
//! (spec §4.6).

use std::collections::HashMap;
use std::sync::Mutex;

use nmt_core::config::SyncConfig;
use nmt_core::errors::SyncError;
use nmt_core::models::{Attractor, ChangeEntry, ChangeOperation, ClockOrdering, Neuron, Synapse, VectorClock};
use nmt_journal::ChangeJournal;
use nmt_storage::{AttractorStore, NeuronStore, SynapseStore};

use crate::peer::PeerState;
use crate::resolver::{resolver_for, ConflictResolver, PendingConflict, Resolution};

/// Counts applied from one `apply_remote_changes` call.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    pub accepted: usize,
    pub rejected: usize,
    pub pending: usize,
}

/// Point-in-time sync state: this node's head sequence, per-peer
/// acknowledgement watermarks, and the outstanding manual-conflict count.
#[derive(Debug, Clone)]
pub struct SyncStatus {
    pub node_id: String,
    pub head_sequence: u64,
    pub peers: Vec<PeerState>,
    pub pending_conflicts: usize,
}

/// `computeStateDiff` result (spec §4.6): what this node has that a peer
/// hasn't acked yet, plus any conflicts still awaiting manual resolution.
/// `remote_ahead` is left for the caller to fill in from the peer's own
/// `changes_since` response — one kernel only ever sees one side of the
/// exchange.
#[derive(Debug, Clone, Default)]
pub struct StateDiff {
    pub local_ahead: Vec<ChangeEntry>,
    pub remote_ahead: Vec<ChangeEntry>,
    pub conflicts: Vec<PendingConflict>,
}

/// Composes the change journal with the entity stores to provide
/// `computeStateDiff` / `applyRemoteChanges` / conflict resolution (spec
/// §4.6). One kernel per node; `node_id` tags every locally authored
/// change entry and vector-clock tick.
pub struct SyncKernel {
    journal: ChangeJournal,
    neurons: NeuronStore,
    synapses: SynapseStore,
    attractors: AttractorStore,
    node_id: String,
    clock: Mutex<VectorClock>,
    resolver: Box<dyn ConflictResolver>,
    peers: Mutex<HashMap<String, PeerState>>,
    pending: Mutex<Vec<PendingConflict>>,
}

impl SyncKernel {
    pub fn new(
        journal: ChangeJournal,
        neurons: NeuronStore,
        synapses: SynapseStore,
        attractors: AttractorStore,
        node_id: impl Into<String>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            journal,
            neurons,
            synapses,
            attractors,
            node_id: node_id.into(),
            clock: Mutex::new(VectorClock::new()),
            resolver: resolver_for(config.conflict_strategy),
            peers: Mutex::new(HashMap::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Records a local mutation: ticks this node's clock entry, appends
    /// to the journal, and returns the committed entry.
    pub fn record_local_change(
        &self,
        entity_type: &str,
        operation: ChangeOperation,
        entity_id: &str,
        data: serde_json::Value,
    ) -> Result<ChangeEntry, SyncError> {
        let clock = {
            let mut clock = self.clock.lock().expect("sync clock mutex poisoned");
            clock.tick(&self.node_id);
            clock.clone()
        };
        self.journal
            .append(entity_type, operation, entity_id, data, clock, None)
            .map_err(SyncError::from)
    }

    /// All locally authored changes strictly after `sequence` — the
    /// payload a peer sends when `computeStateDiff` is requested of it.
    pub fn changes_since(&self, sequence: u64) -> Result<Vec<ChangeEntry>, SyncError> {
        Ok(self.journal.get_after_sequence(sequence)?)
    }

    /// Applies a batch of remote change entries, resolving any collision
    /// with the most recent local change to the same entity through the
    /// configured `ConflictResolver`. Always merges the remote clock into
    /// this node's clock regardless of the resolution outcome, since the
    /// clock tracks causal history rather than which value won.
    pub fn apply_remote_changes(&self, entries: Vec<ChangeEntry>) -> Result<ApplyReport, SyncError> {
        let mut report = ApplyReport::default();

        for remote in entries {
            {
                let mut clock = self.clock.lock().expect("sync clock mutex poisoned");
                *clock = clock.merge(&remote.vector_clock);
            }

            let local_history = self.journal.get_by_entity(&remote.entity_type, &remote.entity_id)?;
            let local_latest = local_history.into_iter().max_by_key(|e| e.sequence);

            // Only a genuinely concurrent local/remote pair is a conflict.
            // A remote that causally dominates local history is a plain
            // fast-forward and applies directly; running it through
            // `ManualResolver` would wedge normal multi-node sync traffic
            // in `Resolution::Pending` forever.
            let resolution = match &local_latest {
                Some(local)
                    if remote.vector_clock.compare(&local.vector_clock) == ClockOrdering::Concurrent =>
                {
                    self.resolver.resolve(local, &remote)
                }
                _ => Resolution::AcceptRemote,
            };

            match resolution {
                Resolution::AcceptRemote => {
                    self.apply_entity_mutation(&remote)?;
                    self.journal.append(
                        &remote.entity_type,
                        remote.operation,
                        &remote.entity_id,
                        remote.data.clone(),
                        remote.vector_clock.clone(),
                        Some(serde_json::json!({"resolvedConflict": local_latest.is_some(), "remoteNode": remote.node_id})),
                    )?;
                    report.accepted += 1;
                    tracing::info!(entity_id = %remote.entity_id, resolver = self.resolver.name(), "sync:resolved");
                }
                Resolution::KeepLocal => {
                    report.rejected += 1;
                    tracing::info!(entity_id = %remote.entity_id, resolver = self.resolver.name(), "sync:resolved");
                }
                Resolution::Pending => {
                    let local = local_latest.expect("pending resolution implies a local conflict");
                    self.pending
                        .lock()
                        .expect("pending conflicts mutex poisoned")
                        .push(PendingConflict::new(local, remote.clone()));
                    report.pending += 1;
                    tracing::warn!(entity_id = %remote.entity_id, "sync:conflict");
                }
            }
        }

        Ok(report)
    }

    fn apply_entity_mutation(&self, entry: &ChangeEntry) -> Result<(), SyncError> {
        match entry.entity_type.as_str() {
            "neuron" => match entry.operation {
                ChangeOperation::Delete => self.neurons.delete(&entry.entity_id).map_err(SyncError::from),
                ChangeOperation::Create | ChangeOperation::Update => {
                    let neuron: Neuron = serde_json::from_value(entry.data.clone()).map_err(|e| {
                        SyncError::MalformedEntry { entity_id: entry.entity_id.clone(), reason: e.to_string() }
                    })?;
                    self.neurons.put(&neuron).map_err(SyncError::from)
                }
            },
            "synapse" => match entry.operation {
                ChangeOperation::Delete => self.synapses.delete(&entry.entity_id).map_err(SyncError::from),
                ChangeOperation::Create | ChangeOperation::Update => {
                    let synapse: Synapse = serde_json::from_value(entry.data.clone()).map_err(|e| {
                        SyncError::MalformedEntry { entity_id: entry.entity_id.clone(), reason: e.to_string() }
                    })?;
                    self.synapses.put(&synapse).map_err(SyncError::from)
                }
            },
            "attractor" => match entry.operation {
                ChangeOperation::Delete => self.attractors.delete(&entry.entity_id).map_err(SyncError::from),
                ChangeOperation::Create | ChangeOperation::Update => {
                    let attractor: Attractor = serde_json::from_value(entry.data.clone()).map_err(|e| {
                        SyncError::MalformedEntry { entity_id: entry.entity_id.clone(), reason: e.to_string() }
                    })?;
                    self.attractors.put(&attractor).map_err(SyncError::from)
                }
            },
            other => Err(SyncError::UnknownEntityType(other.to_string())),
        }
    }

    pub fn register_peer(&self, peer_id: impl Into<String>, last_acked_sequence: u64) {
        let peer_id = peer_id.into();
        let mut peers = self.peers.lock().expect("peers mutex poisoned");
        peers
            .entry(peer_id.clone())
            .and_modify(|p| p.ack(last_acked_sequence))
            .or_insert_with(|| PeerState::new(peer_id, last_acked_sequence));
    }

    pub fn pending_conflicts(&self) -> Vec<PendingConflict> {
        self.pending.lock().expect("pending conflicts mutex poisoned").clone()
    }

    /// Manually settles a queued conflict by applying either side.
    pub fn resolve_pending(&self, index: usize, accept_remote: bool) -> Result<(), SyncError> {
        let conflict = {
            let mut pending = self.pending.lock().expect("pending conflicts mutex poisoned");
            if index >= pending.len() {
                return Err(SyncError::UnresolvedConflict { entity_id: "unknown".to_string() });
            }
            pending.remove(index)
        };
        if accept_remote {
            self.apply_entity_mutation(&conflict.remote)?;
            self.journal.append(
                &conflict.remote.entity_type,
                conflict.remote.operation,
                &conflict.remote.entity_id,
                conflict.remote.data.clone(),
                conflict.remote.vector_clock.clone(),
                Some(serde_json::json!({"resolvedConflict": true, "manual": true})),
            )?;
        }
        Ok(())
    }

    /// Computes the local half of a state diff against a peer last known
    /// to be at `peer_sequence`: every locally authored change since then,
    /// plus any conflicts still pending manual resolution. The caller
    /// (typically after fetching the peer's own diff the same way) merges
    /// both sides into `remote_ahead` before acting on it.
    pub fn compute_state_diff(&self, peer_sequence: u64) -> Result<StateDiff, SyncError> {
        Ok(StateDiff {
            local_ahead: self.changes_since(peer_sequence)?,
            remote_ahead: Vec::new(),
            conflicts: self.pending_conflicts(),
        })
    }

    pub fn status(&self) -> SyncStatus {
        let head_sequence = self
            .journal
            .get_after_sequence(0)
            .map(|entries| entries.last().map(|e| e.sequence).unwrap_or(0))
            .unwrap_or(0);
        SyncStatus {
            node_id: self.node_id.clone(),
            head_sequence,
            peers: self.peers.lock().expect("peers mutex poisoned").values().cloned().collect(),
            pending_conflicts: self.pending.lock().expect("pending conflicts mutex poisoned").len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::config::sync_config::ConflictStrategy;
    use test_fixtures::make_neuron;

    fn kernel(strategy: ConflictStrategy) -> SyncKernel {
        SyncKernel::new(
            ChangeJournal::open_in_memory("node-a").unwrap(),
            NeuronStore::open_in_memory().unwrap(),
            SynapseStore::open_in_memory().unwrap(),
            AttractorStore::open_in_memory().unwrap(),
            "node-a",
            &SyncConfig { conflict_strategy: strategy },
        )
    }

    #[test]
    fn record_local_change_is_visible_in_changes_since() {
        let kernel = kernel(ConflictStrategy::VectorClock);
        let neuron = make_neuron("n1", 4);
        kernel
            .record_local_change("neuron", ChangeOperation::Create, "n1", serde_json::to_value(&neuron).unwrap())
            .unwrap();
        let diff = kernel.changes_since(0).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].entity_id, "n1");
    }

    #[test]
    fn apply_remote_change_with_no_local_history_is_accepted() {
        let kernel = kernel(ConflictStrategy::VectorClock);
        let neuron = make_neuron("n1", 4);
        let mut remote_clock = VectorClock::new();
        remote_clock.tick("node-b");
        let remote = ChangeEntry {
            sequence: 1,
            entity_type: "neuron".to_string(),
            operation: ChangeOperation::Create,
            entity_id: "n1".to_string(),
            data: serde_json::to_value(&neuron).unwrap(),
            vector_clock: remote_clock,
            timestamp: chrono::Utc::now(),
            node_id: "node-b".to_string(),
            metadata: None,
        };
        let report = kernel.apply_remote_changes(vec![remote]).unwrap();
        assert_eq!(report.accepted, 1);
        assert!(kernel.neurons.get("n1").unwrap().is_some());
    }

    #[test]
    fn manual_strategy_queues_conflicting_change() {
        let kernel = kernel(ConflictStrategy::Manual);
        let neuron = make_neuron("n1", 4);
        kernel
            .record_local_change("neuron", ChangeOperation::Create, "n1", serde_json::to_value(&neuron).unwrap())
            .unwrap();

        let mut remote_clock = VectorClock::new();
        remote_clock.tick("node-b");
        let remote = ChangeEntry {
            sequence: 1,
            entity_type: "neuron".to_string(),
            operation: ChangeOperation::Update,
            entity_id: "n1".to_string(),
            data: serde_json::to_value(&neuron).unwrap(),
            vector_clock: remote_clock,
            timestamp: chrono::Utc::now(),
            node_id: "node-b".to_string(),
            metadata: None,
        };
        let report = kernel.apply_remote_changes(vec![remote]).unwrap();
        assert_eq!(report.pending, 1);
        assert_eq!(kernel.pending_conflicts().len(), 1);
    }

    #[test]
    fn status_reports_head_sequence_and_peers() {
        let kernel = kernel(ConflictStrategy::VectorClock);
        let neuron = make_neuron("n1", 4);
        kernel
            .record_local_change("neuron", ChangeOperation::Create, "n1", serde_json::to_value(&neuron).unwrap())
            .unwrap();
        kernel.register_peer("node-b", 0);
        let status = kernel.status();
        assert_eq!(status.head_sequence, 1);
        assert_eq!(status.peers.len(), 1);
    }
}
