pub mod chunk_config;
pub mod defaults;
pub mod embedding_config;
pub mod graph_config;
pub mod hnsw_config;
pub mod journal_config;
pub mod planner_config;
pub mod retrieval_config;
pub mod scheduler_config;
pub mod storage_config;
pub mod sync_config;

use serde::{Deserialize, Serialize};

pub use chunk_config::ChunkConfig;
pub use embedding_config::EmbeddingConfig;
pub use graph_config::GraphConfig;
pub use hnsw_config::HnswConfig;
pub use journal_config::JournalConfig;
pub use planner_config::PlannerConfig;
pub use retrieval_config::RetrievalConfig;
pub use scheduler_config::SchedulerConfig;
pub use storage_config::StorageConfig;
pub use sync_config::SyncConfig;

/// Top-level configuration aggregating all subsystem configs. Loaded from
/// a TOML file (falling back to defaults for missing fields) or built
/// purely in-process for tests.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NmtConfig {
    pub storage: StorageConfig,
    pub chunk: ChunkConfig,
    pub embedding: EmbeddingConfig,
    pub hnsw: HnswConfig,
    pub retrieval: RetrievalConfig,
    pub graph: GraphConfig,
    pub planner: PlannerConfig,
    pub journal: JournalConfig,
    pub sync: SyncConfig,
    pub scheduler: SchedulerConfig,
}

impl NmtConfig {
    /// Load config from a TOML string, falling back to defaults for
    /// missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Resolve the data directory: `NMT_DATA_DIR` env var, else `./data`
    /// (spec §6 environment variables).
    pub fn data_dir() -> std::path::PathBuf {
        std::env::var("NMT_DATA_DIR")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from("./data"))
    }
}
