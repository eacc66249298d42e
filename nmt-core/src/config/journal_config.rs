use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub node_id: String,
    /// Compact entries older than this many sequences behind the head,
    /// during scheduled compaction.
    pub retain_last: u64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            node_id: "local".to_string(),
            retain_last: 100_000,
        }
    }
}
