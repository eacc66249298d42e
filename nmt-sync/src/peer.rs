//! Tracks what each known peer has last acknowledged, so `sync.status()`
//! can report how far behind (or ahead) each peer is.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct PeerState {
    pub peer_id: String,
    pub last_acked_sequence: u64,
    pub last_seen: DateTime<Utc>,
}

impl PeerState {
    pub fn new(peer_id: impl Into<String>, last_acked_sequence: u64) -> Self {
        Self {
            peer_id: peer_id.into(),
            last_acked_sequence,
            last_seen: Utc::now(),
        }
    }

    pub fn ack(&mut self, sequence: u64) {
        self.last_acked_sequence = self.last_acked_sequence.max(sequence);
        self.last_seen = Utc::now();
    }
}
