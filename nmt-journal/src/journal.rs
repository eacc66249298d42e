use std::path::Path;

use chrono::Utc;

use nmt_core::errors::{JournalError, StorageError};
use nmt_core::models::{ChangeEntry, ChangeOperation, VectorClock};
use nmt_storage::{kv, Compactable, WriteConnection};

const TABLE: &str = "journal";
const SEQUENCE_KEY: &str = "meta:sequence";
const DEFAULT_RETAIN_LAST: u64 = 100_000;

/// Per-node, strictly monotonic, durable log of every mutation to a
/// neuron, synapse, or attractor. One journal instance per node; sync
/// exchanges entries between journals on different nodes.
pub struct ChangeJournal {
    conn: WriteConnection,
    node_id: String,
    /// How many of the most recent sequences `Compactable::compact`
    /// keeps when it derives a `beforeSeq` threshold from the current
    /// head (spec §4.6 `JournalConfig::retain_last`).
    retain_last: u64,
}

impl ChangeJournal {
    pub fn open(path: impl AsRef<Path>, node_id: impl Into<String>) -> Result<Self, JournalError> {
        Self::open_with_retention(path, node_id, DEFAULT_RETAIN_LAST)
    }

    pub fn open_with_retention(
        path: impl AsRef<Path>,
        node_id: impl Into<String>,
        retain_last: u64,
    ) -> Result<Self, JournalError> {
        let conn = WriteConnection::open(path).map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        conn.with_conn(|c| kv::ensure_table(c, TABLE))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        Ok(Self {
            conn,
            node_id: node_id.into(),
            retain_last,
        })
    }

    pub fn open_in_memory(node_id: impl Into<String>) -> Result<Self, JournalError> {
        let conn =
            WriteConnection::open_in_memory().map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        conn.with_conn(|c| kv::ensure_table(c, TABLE))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        Ok(Self {
            conn,
            node_id: node_id.into(),
            retain_last: DEFAULT_RETAIN_LAST,
        })
    }

    /// Next sequence number that would be assigned, reading the meta
    /// record. A missing or unparsable meta record is treated as a fresh
    /// journal starting at 0 rather than a fatal error: the journal is
    /// additive and a blown meta counter is recoverable by rescanning
    /// `seq:` keys, which `repair_sequence` does.
    fn next_sequence(conn: &rusqlite::Connection) -> Result<u64, JournalError> {
        match kv::get(conn, TABLE, SEQUENCE_KEY).map_err(|e| JournalError::AppendFailed(e.to_string()))? {
            Some(bytes) => {
                let s = String::from_utf8_lossy(&bytes);
                s.parse::<u64>().map_err(|_| JournalError::MetaCorrupted)
            }
            None => Ok(0),
        }
    }

    fn seq_key(sequence: u64) -> String {
        format!("seq:{sequence:020}")
    }

    fn entity_key(entity_type: &str, entity_id: &str, sequence: u64) -> String {
        format!("entity:{entity_type}:{entity_id}:{sequence:020}")
    }

    fn type_key(entity_type: &str, sequence: u64) -> String {
        format!("type:{entity_type}:{sequence:020}")
    }

    /// Appends one entry, assigning it the next dense sequence number.
    /// The entry, its two secondary indexes, and the bumped sequence
    /// counter are written in a single transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &self,
        entity_type: &str,
        operation: ChangeOperation,
        entity_id: &str,
        data: serde_json::Value,
        vector_clock: VectorClock,
        metadata: Option<serde_json::Value>,
    ) -> Result<ChangeEntry, JournalError> {
        let node_id = self.node_id.clone();
        let entity_type = entity_type.to_string();
        let entity_id = entity_id.to_string();

        self.conn
            .with_tx(|tx| {
                let sequence = Self::next_sequence(tx)
                    .map_err(|e| nmt_core::errors::StorageError::Corruption(e.to_string()))?;
                let entry = ChangeEntry {
                    sequence,
                    entity_type: entity_type.clone(),
                    operation,
                    entity_id: entity_id.clone(),
                    data,
                    vector_clock,
                    timestamp: Utc::now(),
                    node_id: node_id.clone(),
                    metadata,
                };
                let encoded = serde_json::to_vec(&entry)
                    .map_err(|e| nmt_core::errors::StorageError::Serialization(e.to_string()))?;

                kv::put(tx, TABLE, &Self::seq_key(sequence), &encoded)?;
                kv::put(
                    tx,
                    TABLE,
                    &Self::entity_key(&entity_type, &entity_id, sequence),
                    sequence.to_string().as_bytes(),
                )?;
                kv::put(
                    tx,
                    TABLE,
                    &Self::type_key(&entity_type, sequence),
                    sequence.to_string().as_bytes(),
                )?;
                kv::put(
                    tx,
                    TABLE,
                    SEQUENCE_KEY,
                    (sequence + 1).to_string().as_bytes(),
                )?;
                Ok(entry)
            })
            .map_err(|e| JournalError::AppendFailed(e.to_string()))
    }

    /// Appends a batch of entries within one transaction, all-or-nothing,
    /// and returns them with their assigned sequences in order.
    pub fn append_batch(
        &self,
        items: Vec<(String, ChangeOperation, String, serde_json::Value, VectorClock, Option<serde_json::Value>)>,
    ) -> Result<Vec<ChangeEntry>, JournalError> {
        let node_id = self.node_id.clone();
        self.conn
            .with_tx(|tx| {
                let mut sequence = Self::next_sequence(tx)
                    .map_err(|e| nmt_core::errors::StorageError::Corruption(e.to_string()))?;
                let mut entries = Vec::with_capacity(items.len());
                for (entity_type, operation, entity_id, data, vector_clock, metadata) in items {
                    let entry = ChangeEntry {
                        sequence,
                        entity_type: entity_type.clone(),
                        operation,
                        entity_id: entity_id.clone(),
                        data,
                        vector_clock,
                        timestamp: Utc::now(),
                        node_id: node_id.clone(),
                        metadata,
                    };
                    let encoded = serde_json::to_vec(&entry)
                        .map_err(|e| nmt_core::errors::StorageError::Serialization(e.to_string()))?;
                    kv::put(tx, TABLE, &Self::seq_key(sequence), &encoded)?;
                    kv::put(
                        tx,
                        TABLE,
                        &Self::entity_key(&entity_type, &entity_id, sequence),
                        sequence.to_string().as_bytes(),
                    )?;
                    kv::put(
                        tx,
                        TABLE,
                        &Self::type_key(&entity_type, sequence),
                        sequence.to_string().as_bytes(),
                    )?;
                    entries.push(entry);
                    sequence += 1;
                }
                kv::put(tx, TABLE, SEQUENCE_KEY, sequence.to_string().as_bytes())?;
                Ok(entries)
            })
            .map_err(|e| JournalError::AppendFailed(e.to_string()))
    }

    /// Decodes a stored entry, surfacing a corrupt record rather than
    /// panicking or silently skipping it.
    fn decode(sequence: u64, bytes: &[u8]) -> Result<ChangeEntry, JournalError> {
        serde_json::from_slice(bytes).map_err(|e| JournalError::EntryCorrupted {
            sequence,
            reason: e.to_string(),
        })
    }

    pub fn get(&self, sequence: u64) -> Result<Option<ChangeEntry>, JournalError> {
        let raw = self
            .conn
            .with_conn(|c| kv::get(c, TABLE, &Self::seq_key(sequence)))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        raw.map(|bytes| Self::decode(sequence, &bytes)).transpose()
    }

    /// All entries with `from <= sequence <= to`, ascending. A full scan
    /// of the `seq:` prefix filtered in memory: acceptable for a journal
    /// that is compacted on a schedule rather than grown unbounded.
    pub fn get_range(&self, from: u64, to: u64) -> Result<Vec<ChangeEntry>, JournalError> {
        let rows = self
            .conn
            .with_conn(|c| kv::scan_prefix(c, TABLE, "seq:"))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        rows.into_iter()
            .filter_map(|(key, value)| {
                let sequence: u64 = key.strip_prefix("seq:")?.parse().ok()?;
                if sequence < from || sequence > to {
                    return None;
                }
                Some(Self::decode(sequence, &value))
            })
            .collect()
    }

    pub fn get_after_sequence(&self, sequence: u64) -> Result<Vec<ChangeEntry>, JournalError> {
        self.get_range(sequence.saturating_add(1), u64::MAX)
    }

    pub fn get_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<ChangeEntry>, JournalError> {
        let prefix = format!("entity:{entity_type}:{entity_id}:");
        let rows = self
            .conn
            .with_conn(|c| kv::scan_prefix(c, TABLE, &prefix))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        self.resolve_indexed_sequences(rows)
    }

    pub fn get_by_type(&self, entity_type: &str) -> Result<Vec<ChangeEntry>, JournalError> {
        let prefix = format!("type:{entity_type}:");
        let rows = self
            .conn
            .with_conn(|c| kv::scan_prefix(c, TABLE, &prefix))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        self.resolve_indexed_sequences(rows)
    }

    fn resolve_indexed_sequences(
        &self,
        rows: Vec<(String, Vec<u8>)>,
    ) -> Result<Vec<ChangeEntry>, JournalError> {
        let mut out = Vec::with_capacity(rows.len());
        for (_, value) in rows {
            let sequence: u64 = String::from_utf8_lossy(&value)
                .parse()
                .map_err(|_| JournalError::MetaCorrupted)?;
            if let Some(entry) = self.get(sequence)? {
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Drops every entry with `sequence < before_seq`, along with their
    /// secondary-index rows (spec §4.6 `compact(beforeSeq)`: an absolute
    /// sequence threshold, not a relative retention window). Returns the
    /// number of entries removed.
    pub fn compact(&self, before_seq: u64) -> Result<usize, JournalError> {
        if before_seq == 0 {
            return Ok(0);
        }

        let rows = self
            .conn
            .with_conn(|c| kv::scan_prefix(c, TABLE, "seq:"))
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;

        let mut removed = 0;
        self.conn
            .with_tx(|tx| {
                for (key, value) in &rows {
                    let sequence: u64 = match key.strip_prefix("seq:").and_then(|s| s.parse().ok()) {
                        Some(s) => s,
                        None => continue,
                    };
                    if sequence >= before_seq {
                        continue;
                    }
                    if let Ok(entry) = Self::decode(sequence, value) {
                        kv::delete(
                            tx,
                            TABLE,
                            &Self::entity_key(&entry.entity_type, &entry.entity_id, sequence),
                        )?;
                        kv::delete(tx, TABLE, &Self::type_key(&entry.entity_type, sequence))?;
                    }
                    kv::delete(tx, TABLE, key)?;
                    removed += 1;
                }
                Ok(())
            })
            .map_err(|e| JournalError::AppendFailed(e.to_string()))?;
        Ok(removed)
    }
}

/// Wired into `nmt-scheduler`'s periodic sweep alongside the other
/// stores: checkpoints the WAL, then trims entries older than
/// `retain_last` sequences behind the current head via the spec's
/// absolute-threshold `compact(beforeSeq)` contract.
impl Compactable for ChangeJournal {
    fn compact(&self) -> Result<(), StorageError> {
        self.conn.checkpoint()?;

        let head = self
            .conn
            .with_conn(|c| Self::next_sequence(c).map_err(|e| StorageError::Corruption(e.to_string())))?;
        let before_seq = head.saturating_sub(self.retain_last);

        ChangeJournal::compact(self, before_seq)
            .map(|_| ())
            .map_err(|e| StorageError::Sqlite(e.to_string()))
    }
}
