//! Numeric constants shared across default config impls, collected here so
//! they are defined exactly once (mirrors `cortex-core::config::defaults`).

pub const EMBEDDING_DIMENSIONS: usize = 384;

pub const CHUNK_SIZE_FIXED: usize = 4096;
pub const CDC_MIN_CHUNK: usize = 2048;
pub const CDC_MAX_CHUNK: usize = 65536;
pub const CDC_MASK: u64 = 0x1FFF; // expected ~8 KiB average boundary spacing
pub const CDC_WINDOW: usize = 48;

pub const HNSW_M: usize = 16;
pub const HNSW_EF_CONSTRUCTION: usize = 200;
pub const HNSW_EF_SEARCH: usize = 50;
pub const HNSW_TOMBSTONE_THRESHOLD: usize = 50;

pub const HEBBIAN_RATE: f64 = 0.05;
pub const INHIBITORY_RATE: f64 = 0.02;
pub const WORKING_MEMORY_CAPACITY: usize = 7;
pub const EPISODE_BUFFER_CAPACITY: usize = 10;

pub const ASTAR_MAX_DEPTH: usize = 10;
pub const ASTAR_MAX_SEARCH_NODES: usize = 1000;
pub const ASTAR_HEURISTIC_WEIGHT: f64 = 1.0;

pub const COMPACTION_TOMBSTONE_THRESHOLD: usize = 50;
pub const COMPACTION_INTERVAL_MS: u64 = 5 * 60 * 1000;

pub const RESULT_CAP_TOTAL: usize = 200;
pub const RESULT_CAP_RETURNED: usize = 50;
