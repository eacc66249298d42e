use std::sync::Arc;

use nmt_core::errors::NmtError;
use nmt_core::models::ChangeOperation;
use nmt_sync::{ApplyReport, PeerState, PendingConflict, SyncKernel, SyncStatus};

/// Thin facade over [`SyncKernel`], exposed as `Store.sync` (spec §6:
/// `sync.status()`, `sync.changesSince`, `sync.applyRemoteChanges`,
/// `sync.peers`).
pub struct SyncHandle {
    kernel: Arc<SyncKernel>,
}

impl SyncHandle {
    pub(crate) fn new(kernel: Arc<SyncKernel>) -> Self {
        Self { kernel }
    }

    pub(crate) fn record_change(
        &self,
        entity_type: &str,
        operation: ChangeOperation,
        entity_id: &str,
        data: serde_json::Value,
    ) -> Result<nmt_core::models::ChangeEntry, NmtError> {
        Ok(self
            .kernel
            .record_local_change(entity_type, operation, entity_id, data)?)
    }

    pub fn status(&self) -> SyncStatus {
        self.kernel.status()
    }

    pub fn changes_since(&self, sequence: u64) -> Result<Vec<nmt_core::models::ChangeEntry>, NmtError> {
        Ok(self.kernel.changes_since(sequence)?)
    }

    pub fn apply_remote_changes(
        &self,
        entries: Vec<nmt_core::models::ChangeEntry>,
    ) -> Result<ApplyReport, NmtError> {
        Ok(self.kernel.apply_remote_changes(entries)?)
    }

    pub fn peers(&self) -> Vec<PeerState> {
        self.kernel.status().peers
    }

    pub fn register_peer(&self, peer_id: impl Into<String>, last_acked_sequence: u64) {
        self.kernel.register_peer(peer_id, last_acked_sequence);
    }

    pub fn pending_conflicts(&self) -> Vec<PendingConflict> {
        self.kernel.pending_conflicts()
    }

    pub fn resolve_pending(&self, index: usize, accept_remote: bool) -> Result<(), NmtError> {
        Ok(self.kernel.resolve_pending(index, accept_remote)?)
    }
}
