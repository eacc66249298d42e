use serde::{Deserialize, Serialize};

use super::defaults::{COMPACTION_INTERVAL_MS, COMPACTION_TOMBSTONE_THRESHOLD};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tombstone_threshold: usize,
    pub interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tombstone_threshold: COMPACTION_TOMBSTONE_THRESHOLD,
            interval_ms: COMPACTION_INTERVAL_MS,
        }
    }
}
