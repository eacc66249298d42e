//! Top-level orchestrator: composes chunking, embeddings, the vector
//! index, the neuron graph, the attractor planner, the change journal,
//! and CRDT sync behind one public API (spec §6). No direct teacher
//! equivalent was retrieved (`cortex-storage/src/engine.rs` was declared
//! but not retrieved in the example pack); this crate is written fresh
//! following the dependency-injection and capability-interface guidance
//! of spec §9, reusing every subsystem crate's own teacher-grounded idioms.

mod content;
mod graph_ops;
mod health;
mod ingest;
mod planner_ops;
mod search;
mod shutdown;
mod sync_ops;

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;

pub use nmt_core::config::NmtConfig;
pub use nmt_core::errors::{ErrorKind, NmtError, NmtResult};
pub use nmt_core::models::{
    Attractor, ChangeEntry, ChangeOperation, IngestionJob, JobStatus, Neuron, Provenance,
    Synapse, SynapseType,
};
pub use nmt_graph::PruneReport;
pub use nmt_hash::MerkleProof;
pub use nmt_metrics::{HealthMetrics, HealthReport, HealthStatus, SubsystemHealth};
pub use nmt_planner::PathResult;
pub use nmt_sync::{ApplyReport, PeerState, PendingConflict, SyncStatus};

use nmt_embeddings::EmbeddingEngine;
use nmt_graph::NeuronGraphManager;
use nmt_hnsw::HnswIndex;
use nmt_journal::ChangeJournal;
use nmt_metrics::MetricsRegistry;
use nmt_planner::PlannerEngine;
use nmt_scheduler::{CompactionScheduler, CompactionTargets, SerialTaskQueue};
use nmt_storage::{AttractorStore, ChunkStore, Compactable, IndexStore, NeuronStore, SynapseStore};
use nmt_sync::SyncKernel;

pub use sync_ops::SyncHandle;

/// Options accepted by [`Store::ingest_text`] / [`Store::start_ingestion_job`]
/// (spec §6 `ingestText` options bag).
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub source_type: String,
    pub tags: BTreeSet<String>,
    pub use_cdc: bool,
    pub chunk_size: Option<usize>,
    pub auto_connect: bool,
    pub connection_threshold: Option<f32>,
    pub provenance: Option<Provenance>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            source_type: "note".to_string(),
            tags: BTreeSet::new(),
            use_cdc: false,
            chunk_size: None,
            auto_connect: true,
            connection_threshold: None,
            provenance: None,
        }
    }
}

/// Options accepted by [`Store::search`] / [`Store::search_similar_to`]
/// (spec §6 `search` options bag). `None` fields fall back to
/// [`nmt_core::config::RetrievalConfig`] defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub k: Option<usize>,
    pub ef: Option<usize>,
    pub threshold: Option<f32>,
    pub include_content: bool,
    pub include_proof: bool,
    pub tags: Option<BTreeSet<String>>,
    pub source_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub neuron: Neuron,
    pub score: f64,
    pub content: Option<String>,
    pub proof: Option<MerkleProof>,
}

/// Per-neuron Merkle/chunk integrity report (spec §7: chunk-level hash
/// mismatches accumulate rather than aborting verification).
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub details: VerifyDetails,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyDetails {
    pub merkle_valid: bool,
    pub chunk_count: usize,
    pub chunk_hash_mismatches: Vec<usize>,
}

/// The public entry point of the memory store. Owns every subsystem's
/// storage handles; `sync`, `planner`, and `graph` each hold their own
/// separate connections onto the same on-disk SQLite files (valid under
/// WAL mode, see DESIGN.md), mirroring how the subsystems' own test
/// suites construct them independently.
pub struct Store {
    config: NmtConfig,
    chunks: ChunkStore,
    neurons: NeuronStore,
    synapses: SynapseStore,
    attractors: AttractorStore,
    index_store: IndexStore,
    embedder: Arc<EmbeddingEngine>,
    graph: Arc<NeuronGraphManager>,
    planner: PlannerEngine,
    pub sync: SyncHandle,
    task_queue: Arc<SerialTaskQueue>,
    metrics: Arc<MetricsRegistry>,
    compaction: StdMutex<Option<CompactionScheduler>>,
    jobs: StdMutex<HashMap<String, IngestionJob>>,
    started_at: Instant,
}

impl Store {
    /// Opens (creating if absent) the on-disk store rooted at
    /// `config.storage.data_dir`, laid out per spec §6: `chunks/`,
    /// `neurons/`, `synapses/`, `index/`, `journal/`, `probabilistic/`.
    pub fn open(config: NmtConfig) -> Result<Arc<Self>, NmtError> {
        let data_dir = PathBuf::from(&config.storage.data_dir);
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| NmtError::Config(format!("create data dir {}: {e}", data_dir.display())))?;

        let chunks_path = data_dir.join("chunks").join("data.db");
        let neurons_path = data_dir.join("neurons").join("data.db");
        let synapses_path = data_dir.join("synapses").join("data.db");
        let index_path = data_dir.join("index").join("data.db");
        let journal_path = data_dir.join("journal").join("data.db");
        let attractors_path = data_dir.join("probabilistic").join("data.db");

        let chunks = ChunkStore::open(&chunks_path)?;
        let graph_chunks = ChunkStore::open(&chunks_path)?;
        let compaction_chunks = ChunkStore::open(&chunks_path)?;

        let neurons = NeuronStore::open(&neurons_path)?;
        let graph_neurons = NeuronStore::open(&neurons_path)?;
        let planner_neurons = NeuronStore::open(&neurons_path)?;
        let sync_neurons = NeuronStore::open(&neurons_path)?;
        let compaction_neurons = NeuronStore::open(&neurons_path)?;

        let synapses = SynapseStore::open(&synapses_path)?;
        let graph_synapses = SynapseStore::open(&synapses_path)?;
        let planner_synapses = SynapseStore::open(&synapses_path)?;
        let sync_synapses = SynapseStore::open(&synapses_path)?;
        let compaction_synapses = SynapseStore::open(&synapses_path)?;

        let attractors = AttractorStore::open(&attractors_path)?;
        let planner_attractors = AttractorStore::open(&attractors_path)?;
        let sync_attractors = AttractorStore::open(&attractors_path)?;
        let compaction_attractors = AttractorStore::open(&attractors_path)?;

        let index_store = IndexStore::open(&index_path)?;
        let compaction_index = IndexStore::open(&index_path)?;

        let hnsw_index = match index_store.load("main")? {
            Some(index) => index,
            None => HnswIndex::new(&config.hnsw),
        };

        let journal = ChangeJournal::open_with_retention(
            &journal_path,
            config.journal.node_id.clone(),
            config.journal.retain_last,
        )?;
        let compaction_journal = ChangeJournal::open_with_retention(
            &journal_path,
            config.journal.node_id.clone(),
            config.journal.retain_last,
        )?;

        let embedder = Arc::new(EmbeddingEngine::new(&config.embedding)?);

        let graph = Arc::new(NeuronGraphManager::new(
            graph_neurons,
            graph_synapses,
            graph_chunks,
            hnsw_index,
            config.graph.clone(),
            config.retrieval.clone(),
        ));

        let planner = PlannerEngine::new(
            planner_attractors,
            planner_neurons,
            planner_synapses,
            config.planner.clone(),
        );

        let sync_kernel = Arc::new(SyncKernel::new(
            journal,
            sync_neurons,
            sync_synapses,
            sync_attractors,
            config.journal.node_id.clone(),
            &config.sync,
        ));

        let task_queue = SerialTaskQueue::new(256);
        let metrics = Arc::new(MetricsRegistry::new());

        let compaction_targets = CompactionTargets {
            graph: graph.clone(),
            stores: vec![
                Arc::new(compaction_chunks) as Arc<dyn Compactable + Send + Sync>,
                Arc::new(compaction_neurons) as Arc<dyn Compactable + Send + Sync>,
                Arc::new(compaction_synapses) as Arc<dyn Compactable + Send + Sync>,
                Arc::new(compaction_index) as Arc<dyn Compactable + Send + Sync>,
                Arc::new(compaction_attractors) as Arc<dyn Compactable + Send + Sync>,
                Arc::new(compaction_journal) as Arc<dyn Compactable + Send + Sync>,
            ],
        };
        let tick_metrics = metrics.clone();
        let compaction = CompactionScheduler::start(compaction_targets, config.scheduler.clone(), move |report| {
            tick_metrics.gauge_set("compaction.tombstones_before", report.tombstones_before as f64);
            tick_metrics.counter_add("compaction.stores_checkpointed", report.stores_checkpointed as u64);
            if report.index_compacted {
                tick_metrics.counter_inc("compaction.index_compactions");
            }
        });

        Ok(Arc::new(Self {
            config,
            chunks,
            neurons,
            synapses,
            attractors,
            index_store,
            embedder,
            graph,
            planner,
            sync: SyncHandle::new(sync_kernel),
            task_queue,
            metrics,
            compaction: StdMutex::new(Some(compaction)),
            jobs: StdMutex::new(HashMap::new()),
            started_at: Instant::now(),
        }))
    }

    /// Opens the store at `NMT_DATA_DIR` (or `./data`) with every other
    /// subsystem on its built-in defaults.
    pub fn open_default() -> Result<Arc<Self>, NmtError> {
        let mut config = NmtConfig::default();
        config.storage.data_dir = NmtConfig::data_dir().to_string_lossy().into_owned();
        Self::open(config)
    }

    pub fn config(&self) -> &NmtConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Removes every chunk not referenced by any live neuron's
    /// `chunk_hashes` (spec §4.5 `gc`).
    pub fn gc_chunks(&self) -> Result<usize, NmtError> {
        let mut live = std::collections::HashSet::new();
        for neuron in self.neurons.all()? {
            live.extend(neuron.chunk_hashes);
        }
        Ok(self.chunks.gc(&live)?)
    }

    pub fn list_attractors(&self) -> Result<Vec<Attractor>, NmtError> {
        Ok(self.attractors.all()?)
    }
}
