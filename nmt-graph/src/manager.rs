use std::collections::BTreeSet;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use nmt_core::config::{GraphConfig, RetrievalConfig};
use nmt_core::errors::GraphError;
use nmt_core::models::{Neuron, NeuronMetadata, Provenance, Synapse, SynapseMetadata, SynapseType};
use nmt_core::traits::EmbeddingProvider;
use nmt_hnsw::HnswIndex;
use nmt_retrieval::{bm25_score, boosted_score, hybrid_score, tokenize};
use nmt_storage::{ChunkStore, NeuronStore, SynapseStore};

use crate::dopamine::Dopamine;
use crate::episode_buffer::EpisodeBuffer;
use crate::working_memory::WorkingMemory;

/// A neuron paired with the score it was retrieved under.
#[derive(Debug, Clone)]
pub struct ScoredNeuron {
    pub neuron: Neuron,
    pub score: f64,
}

/// Result of a `retrieve()` call. `fire_and_forget_ids` is populated (with
/// the returned result ids) only when there were at least two results,
/// mirroring the gate on step 7's reinforcement calls (spec §4.3). The
/// caller is expected to dispatch `reinforce_co_activation`,
/// `inhibit_co_activation`, and `encode_episode` for these ids through its
/// own task queue (`nmt-scheduler::SerialTaskQueue`) rather than have this
/// crate depend on the scheduler.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub results: Vec<ScoredNeuron>,
    pub fire_and_forget_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy)]
pub struct PruneReport {
    pub examined: usize,
    pub pruned: usize,
    pub dry_run: bool,
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

/// Owns the neuron/synapse stores, the vector index, and the working-
/// memory/episode-buffer/dopamine state that the hybrid retrieval pipeline
/// threads through. Grounded on `cortex-causal::graph::GraphManager`'s
/// `Arc<RwLock<...>>` + read/write-helper shape, generalized to read
/// adjacency from `nmt-storage` instead of a private graph structure.
pub struct NeuronGraphManager {
    neurons: NeuronStore,
    synapses: SynapseStore,
    chunks: ChunkStore,
    index: RwLock<HnswIndex>,
    graph_config: GraphConfig,
    retrieval_config: RetrievalConfig,
    working_memory: Mutex<WorkingMemory>,
    episode_buffer: Mutex<EpisodeBuffer>,
    dopamine: Mutex<Dopamine>,
    /// Serializes read-modify-write synapse weight updates so concurrent
    /// `reinforceCoActivation`/`inhibitCoActivation` calls on the same pair
    /// cannot race each other's get-then-put.
    synapse_rw_lock: Mutex<()>,
}

impl NeuronGraphManager {
    pub fn new(
        neurons: NeuronStore,
        synapses: SynapseStore,
        chunks: ChunkStore,
        index: HnswIndex,
        graph_config: GraphConfig,
        retrieval_config: RetrievalConfig,
    ) -> Self {
        let working_memory = WorkingMemory::new(graph_config.working_memory_capacity);
        let episode_buffer = EpisodeBuffer::new(graph_config.episode_buffer_capacity);
        let dopamine = Dopamine::new(&graph_config);
        Self {
            neurons,
            synapses,
            chunks,
            index: RwLock::new(index),
            graph_config,
            retrieval_config,
            working_memory: Mutex::new(working_memory),
            episode_buffer: Mutex::new(episode_buffer),
            dopamine: Mutex::new(dopamine),
            synapse_rw_lock: Mutex::new(()),
        }
    }

    fn require_neuron(&self, id: &str) -> Result<Neuron, GraphError> {
        self.neurons
            .get(id)?
            .ok_or_else(|| GraphError::NeuronNotFound(id.to_string()))
    }

    // -- creation / deletion -------------------------------------------------

    /// `createNeuron` (spec §4.3). Persists the neuron, inserts it into the
    /// vector index, then auto-connects it to existing neurons above
    /// `auto_connect_threshold` among the `auto_connect_k` nearest.
    pub fn create_neuron(
        &self,
        embedding: Vec<f32>,
        chunk_hashes: Vec<String>,
        merkle_root: String,
        source_type: impl Into<String>,
    ) -> Result<Neuron, GraphError> {
        self.create_neuron_with_metadata(embedding, chunk_hashes, merkle_root, source_type, BTreeSet::new(), None, true, None)
    }

    /// `createNeuron` with the optional tag set, provenance record,
    /// and auto-connect override `ingestText` accepts (spec §6). When
    /// `auto_connect` is false no synapses are created; `connection_threshold`
    /// overrides `GraphConfig::auto_connect_threshold` for this call only.
    #[allow(clippy::too_many_arguments)]
    pub fn create_neuron_with_metadata(
        &self,
        embedding: Vec<f32>,
        chunk_hashes: Vec<String>,
        merkle_root: String,
        source_type: impl Into<String>,
        tags: BTreeSet<String>,
        provenance: Option<Provenance>,
        auto_connect: bool,
        connection_threshold: Option<f32>,
    ) -> Result<Neuron, GraphError> {
        let id = Uuid::new_v4().to_string();
        let mut metadata = NeuronMetadata::new(source_type);
        metadata.tags = tags;
        metadata.provenance = provenance;
        let neuron = Neuron {
            id: id.clone(),
            embedding: embedding.clone(),
            chunk_hashes,
            merkle_root,
            metadata,
            outgoing_synapses: Vec::new(),
            incoming_synapses: Vec::new(),
        };
        self.neurons.put(&neuron)?;
        self.index
            .write()
            .unwrap()
            .insert(id.clone(), embedding.clone())
            .map_err(|e| GraphError::Index(e.to_string()))?;

        if auto_connect {
            let threshold = connection_threshold.unwrap_or(self.graph_config.auto_connect_threshold);
            let neighbors = self
                .index
                .read()
                .unwrap()
                .search(&embedding, self.graph_config.auto_connect_k + 1, None);
            for (neighbor_id, score) in neighbors {
                if neighbor_id == id || score < threshold {
                    continue;
                }
                self.connect(&id, &neighbor_id, SynapseType::Semantic, Some(score as f64), false)?;
            }
        }

        Ok(neuron)
    }

    /// `connect` (spec §4.3). Creates a directed synapse, and a second one
    /// in the opposite direction when `bidirectional` is set. Each
    /// direction is an independent record (DESIGN.md open question).
    pub fn connect(
        &self,
        source_id: &str,
        target_id: &str,
        synapse_type: SynapseType,
        weight: Option<f64>,
        bidirectional: bool,
    ) -> Result<(String, Option<String>), GraphError> {
        if !self.neurons.exists(source_id)? {
            return Err(GraphError::ReferentialIntegrity(format!(
                "connect: source neuron {source_id} does not exist"
            )));
        }
        if !self.neurons.exists(target_id)? {
            return Err(GraphError::ReferentialIntegrity(format!(
                "connect: target neuron {target_id} does not exist"
            )));
        }

        let forward = self.put_synapse(source_id, target_id, synapse_type, weight.unwrap_or(0.5), bidirectional)?;

        let backward = if bidirectional {
            Some(self.put_synapse(target_id, source_id, synapse_type, weight.unwrap_or(0.5), bidirectional)?)
        } else {
            None
        };

        Ok((forward, backward))
    }

    fn put_synapse(
        &self,
        source_id: &str,
        target_id: &str,
        synapse_type: SynapseType,
        weight: f64,
        bidirectional: bool,
    ) -> Result<String, GraphError> {
        let synapse_id = Uuid::new_v4().to_string();
        let synapse = Synapse {
            id: synapse_id.clone(),
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            synapse_type,
            weight: Synapse::clamp_weight(weight),
            metadata: SynapseMetadata::new(bidirectional),
        };
        self.synapses.put(&synapse)?;

        let mut source_neuron = self.require_neuron(source_id)?;
        source_neuron.outgoing_synapses.push(synapse_id.clone());
        self.neurons.put(&source_neuron)?;

        let mut target_neuron = self.require_neuron(target_id)?;
        target_neuron.incoming_synapses.push(synapse_id.clone());
        self.neurons.put(&target_neuron)?;

        Ok(synapse_id)
    }

    /// `deleteNeuron` (spec §4.3). Cascades to every synapse touching this
    /// neuron in either direction, tombstones its HNSW node, then deletes
    /// the neuron record itself.
    pub fn delete_neuron(&self, id: &str) -> Result<(), GraphError> {
        self.require_neuron(id)?;

        for synapse in self.synapses.by_source(id)? {
            self.synapses.delete(&synapse.id)?;
            self.unlink_incoming(&synapse.target_id, &synapse.id)?;
        }
        for synapse in self.synapses.by_target(id)? {
            self.synapses.delete(&synapse.id)?;
            self.unlink_outgoing(&synapse.source_id, &synapse.id)?;
        }

        {
            let mut index = self.index.write().unwrap();
            if index.has(id) {
                index
                    .delete(id)
                    .map_err(|e| GraphError::Index(e.to_string()))?;
            }
        }

        self.neurons.delete(id)?;
        Ok(())
    }

    fn unlink_outgoing(&self, neuron_id: &str, synapse_id: &str) -> Result<(), GraphError> {
        if let Some(mut neuron) = self.neurons.get(neuron_id)? {
            neuron.outgoing_synapses.retain(|s| s != synapse_id);
            self.neurons.put(&neuron)?;
        }
        Ok(())
    }

    fn unlink_incoming(&self, neuron_id: &str, synapse_id: &str) -> Result<(), GraphError> {
        if let Some(mut neuron) = self.neurons.get(neuron_id)? {
            neuron.incoming_synapses.retain(|s| s != synapse_id);
            self.neurons.put(&neuron)?;
        }
        Ok(())
    }

    // -- similarity / pattern completion -------------------------------------

    /// `findSimilar` (spec §4.3). Searches the vector index and hydrates
    /// every hit from the neuron store, silently skipping ids the store no
    /// longer has (a race with a concurrent delete).
    pub fn find_similar(
        &self,
        embedding: &[f32],
        k: usize,
        ef: Option<usize>,
    ) -> Result<Vec<ScoredNeuron>, GraphError> {
        let hits = self.index.read().unwrap().search(embedding, k, ef);
        let mut out = Vec::with_capacity(hits.len());
        for (id, score) in hits {
            if let Some(neuron) = self.neurons.get(&id)? {
                out.push(ScoredNeuron { neuron, score: score as f64 });
            }
        }
        Ok(out)
    }

    /// `patternComplete` (spec §4.3). Iteratively refines `query` toward
    /// the score-weighted mean of its nearest neighbors, Hopfield-style.
    /// A graceful no-op on an empty index.
    pub fn pattern_complete(
        &self,
        query: Vec<f32>,
        candidate_count: usize,
        iterations: usize,
        alpha: f64,
    ) -> Result<Vec<f32>, GraphError> {
        if self.index.read().unwrap().is_empty() {
            return Ok(query);
        }

        let mut current = query;
        for _ in 0..iterations {
            let candidates = self.find_similar(&current, candidate_count, None)?;
            if candidates.is_empty() {
                break;
            }
            let weight_sum: f64 = candidates.iter().map(|c| c.score).sum();
            if weight_sum <= 0.0 {
                break;
            }
            let dims = current.len();
            let mut mean = vec![0.0f32; dims];
            for candidate in &candidates {
                let w = (candidate.score / weight_sum) as f32;
                for (slot, value) in mean.iter_mut().zip(candidate.neuron.embedding.iter()) {
                    *slot += w * value;
                }
            }
            let a = alpha as f32;
            let blended: Vec<f32> = current
                .iter()
                .zip(mean.iter())
                .map(|(q, m)| a * q + (1.0 - a) * m)
                .collect();
            current = normalize(blended);
        }
        Ok(current)
    }

    // -- learning -------------------------------------------------------------

    fn find_synapse(&self, source_id: &str, target_id: &str, synapse_type: SynapseType) -> Result<Option<Synapse>, GraphError> {
        Ok(self
            .synapses
            .by_source(source_id)?
            .into_iter()
            .find(|s| s.target_id == target_id && s.synapse_type == synapse_type))
    }

    fn hebbian_bump(&self, source_id: &str, target_id: &str, synapse_type: SynapseType, rate: f64) -> Result<(), GraphError> {
        let _guard = self.synapse_rw_lock.lock().unwrap();
        match self.find_synapse(source_id, target_id, synapse_type)? {
            Some(mut synapse) => {
                synapse.weight = Synapse::clamp_weight(synapse.weight + rate * (1.0 - synapse.weight));
                synapse.metadata.record_activation(Utc::now());
                self.synapses.put(&synapse)?;
            }
            None => {
                self.put_synapse(source_id, target_id, synapse_type, rate, false)?;
            }
        }
        Ok(())
    }

    /// `reinforceCoActivation` (spec §4.3). Hebbian update across every
    /// unordered pair of co-retrieved ids: `w <- clamp(w + eta*(1-w), 0, 1)`.
    pub fn reinforce_co_activation(&self, ids: &[String]) -> Result<(), GraphError> {
        let rate = self.graph_config.hebbian_rate;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                self.hebbian_bump(&ids[i], &ids[j], SynapseType::Associative, rate)?;
            }
        }
        Ok(())
    }

    /// `inhibitCoActivation` (spec §4.3). Inhibitory edges from the
    /// top-scoring id (assumed to be `ids[0]`) to every other id.
    pub fn inhibit_co_activation(&self, ids: &[String]) -> Result<(), GraphError> {
        let Some((top, rest)) = ids.split_first() else {
            return Ok(());
        };
        let rate = self.graph_config.inhibitory_rate;
        for other in rest {
            self.hebbian_bump(top, other, SynapseType::Inhibitory, rate)?;
        }
        Ok(())
    }

    /// `encodeEpisode` (spec §4.3). Links co-retrieved ids into a ring of
    /// `TEMPORAL` synapses, one hop per adjacent pair in retrieval order.
    pub fn encode_episode(&self, ids: &[String]) -> Result<(), GraphError> {
        if ids.len() < 2 {
            return Ok(());
        }
        let _guard = self.synapse_rw_lock.lock().unwrap();
        for i in 0..ids.len() {
            let next = (i + 1) % ids.len();
            if self.find_synapse(&ids[i], &ids[next], SynapseType::Temporal)?.is_none() {
                self.put_synapse(&ids[i], &ids[next], SynapseType::Temporal, 1.0, false)?;
            }
        }
        Ok(())
    }

    /// `maxCoActivationWeight` (spec §4.3): the strongest `ASSOCIATIVE`
    /// edge between `id` and any of `peers`, in either direction.
    pub fn max_co_activation_weight(&self, id: &str, peers: &[String]) -> Result<f64, GraphError> {
        self.max_weight_among(id, peers, SynapseType::Associative)
    }

    /// `maxInhibitoryWeight` (spec §4.3): the strongest `INHIBITORY` edge
    /// between `id` and any of `peers`, in either direction.
    pub fn max_inhibitory_weight(&self, id: &str, peers: &[String]) -> Result<f64, GraphError> {
        self.max_weight_among(id, peers, SynapseType::Inhibitory)
    }

    fn max_weight_among(&self, id: &str, peers: &[String], synapse_type: SynapseType) -> Result<f64, GraphError> {
        let mut candidates = self.synapses.by_source(id)?;
        candidates.extend(self.synapses.by_target(id)?);
        let peer_set: BTreeSet<&String> = peers.iter().collect();
        Ok(candidates
            .into_iter()
            .filter(|s| s.synapse_type == synapse_type)
            .filter(|s| peer_set.contains(&s.source_id) || peer_set.contains(&s.target_id))
            .map(|s| s.weight)
            .fold(0.0, f64::max))
    }

    /// `updateNeuronEmbedding` (spec §4.3). Replaces the stored vector and
    /// re-inserts the node into the index under the same id.
    pub fn update_neuron_embedding(&self, id: &str, embedding: Vec<f32>) -> Result<(), GraphError> {
        let mut neuron = self.require_neuron(id)?;
        neuron.embedding = embedding.clone();
        neuron.metadata.updated_at = Utc::now();
        self.neurons.put(&neuron)?;
        self.reindex(id, embedding)?;
        Ok(())
    }

    fn reindex(&self, id: &str, embedding: Vec<f32>) -> Result<(), GraphError> {
        let mut index = self.index.write().unwrap();
        if index.has(id) {
            index.delete(id).map_err(|e| GraphError::Index(e.to_string()))?;
        }
        index
            .insert(id.to_string(), embedding)
            .map_err(|e| GraphError::Index(e.to_string()))
    }

    /// `recordFeedback` (spec §4.3 "Online embedding learning"): nudges the
    /// neuron's embedding toward (relevant) or away from (irrelevant) the
    /// query's embedding, scaled by the dopamine-modulated learning rate,
    /// and folds the feedback into the drift/count bookkeeping.
    pub fn record_feedback(
        &self,
        id: &str,
        query_text: &str,
        relevant: bool,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<(), GraphError> {
        let mut neuron = self.require_neuron(id)?;
        let query_embedding = embedder
            .embed(query_text)
            .map_err(|e| GraphError::Embedding(e.to_string()))?;
        if query_embedding.len() != neuron.embedding.len() {
            return Err(GraphError::DimensionMismatch {
                expected: neuron.embedding.len(),
                got: query_embedding.len(),
            });
        }

        let eta = self
            .dopamine
            .lock()
            .unwrap()
            .effective_rate(self.graph_config.hebbian_rate);
        let sign = if relevant { 1.0 } else { -1.0 };
        let eta = (eta * sign) as f32;

        let nudged: Vec<f32> = neuron
            .embedding
            .iter()
            .zip(query_embedding.iter())
            .map(|(v, q)| v + eta * (q - v))
            .collect();
        let new_embedding = normalize(nudged);

        let drift: f64 = new_embedding
            .iter()
            .zip(neuron.embedding.iter())
            .map(|(a, b)| ((*a - *b) as f64).powi(2))
            .sum::<f64>()
            .sqrt();

        neuron.embedding = new_embedding.clone();
        neuron.metadata.feedback_count += 1;
        neuron.metadata.embedding_drift += drift;
        neuron.metadata.updated_at = Utc::now();
        self.neurons.put(&neuron)?;
        self.reindex(id, new_embedding)?;

        let mut dopamine = self.dopamine.lock().unwrap();
        if relevant {
            dopamine.positive_feedback();
        } else {
            dopamine.negative_feedback();
        }
        Ok(())
    }

    /// `pruneSynapses` (spec §4.3): removes every synapse whose weight is
    /// below `min_weight` *and* whose activation count is below
    /// `min_activations`. `dry_run` reports what would be pruned without
    /// mutating anything.
    pub fn prune_synapses(&self, min_weight: f64, min_activations: u64, dry_run: bool) -> Result<PruneReport, GraphError> {
        let all = self.synapses.all()?;
        let examined = all.len();
        let mut pruned = 0;
        for synapse in all {
            if synapse.weight < min_weight && synapse.metadata.activation_count < min_activations {
                pruned += 1;
                if !dry_run {
                    self.synapses.delete(&synapse.id)?;
                    self.unlink_outgoing(&synapse.source_id, &synapse.id)?;
                    self.unlink_incoming(&synapse.target_id, &synapse.id)?;
                }
            }
        }
        Ok(PruneReport { examined, pruned, dry_run })
    }

    // -- compaction ---------------------------------------------------------

    /// Whether the vector index's tombstone ratio warrants a compaction
    /// pass, driven from `nmt-scheduler::CompactionScheduler`.
    pub fn index_needs_compaction(&self) -> bool {
        self.index.read().unwrap().needs_compaction()
    }

    pub fn index_tombstone_count(&self) -> usize {
        self.index.read().unwrap().tombstone_count()
    }

    pub fn index_len(&self) -> usize {
        self.index.read().unwrap().len()
    }

    /// Drops tombstoned HNSW nodes, rewriting surviving connections.
    pub fn compact_index(&self) {
        self.index.write().unwrap().compact();
    }

    /// Snapshot of the vector index for persistence (spec §6 graceful
    /// shutdown: "save HNSW snapshot").
    pub fn index_snapshot(&self) -> nmt_hnsw::HnswSnapshot {
        self.index.read().unwrap().to_snapshot()
    }

    // -- retrieval --------------------------------------------------------

    fn reconstruct_content(&self, neuron: &Neuron) -> Result<String, GraphError> {
        let mut text = String::new();
        for hash in &neuron.chunk_hashes {
            if let Some(chunk) = self.chunks.get(hash)? {
                text.push_str(&String::from_utf8_lossy(&chunk.data));
            }
        }
        Ok(text)
    }

    /// The 10-step hybrid retrieval pipeline (spec §4.3):
    /// pattern-complete the query, pull `2k` HNSW candidates, filter on
    /// score/tags/source type, fuse semantic with BM25 keyword scoring at
    /// an adaptive weight, boost by co-activation/inhibition/working-
    /// memory, re-sort and truncate to `k`, then update working memory,
    /// the episode buffer, and dopamine decay.
    ///
    /// Fire-and-forget reinforcement (step 7) is not performed here: it is
    /// surfaced via `fire_and_forget_ids` for the caller to dispatch
    /// through its own task queue.
    #[allow(clippy::too_many_arguments)]
    pub fn retrieve(
        &self,
        query_embedding: Vec<f32>,
        query_text: Option<&str>,
        k: usize,
        threshold: f32,
        tag_filter: Option<&BTreeSet<String>>,
        source_type_filter: Option<&str>,
    ) -> Result<RetrievalOutcome, GraphError> {
        let candidate_count = (k * 2).max(1);
        let completed = self.pattern_complete(
            query_embedding,
            candidate_count,
            self.graph_config.pattern_complete_iterations,
            self.graph_config.pattern_complete_alpha,
        )?;

        let candidates = self.find_similar(&completed, candidate_count, None)?;

        let filtered: Vec<ScoredNeuron> = candidates
            .into_iter()
            .filter(|c| c.score as f32 >= threshold)
            .filter(|c| match tag_filter {
                Some(tags) => tags.is_subset(&c.neuron.metadata.tags),
                None => true,
            })
            .filter(|c| match source_type_filter {
                Some(source_type) => c.neuron.metadata.source_type == source_type,
                None => true,
            })
            .collect();

        let query_tokens = query_text.map(tokenize).unwrap_or_default();
        let peer_ids: Vec<String> = filtered.iter().map(|c| c.neuron.id.clone()).collect();

        let working_memory = self.working_memory.lock().unwrap();
        let mut scored = Vec::with_capacity(filtered.len());
        for candidate in filtered {
            let keyword_score = if query_tokens.is_empty() {
                0.0
            } else {
                let content = self.reconstruct_content(&candidate.neuron)?;
                bm25_score(&query_tokens, &tokenize(&content), self.retrieval_config.bm25_k1)
            };
            let hybrid = hybrid_score(&self.retrieval_config, candidate.score, keyword_score, query_tokens.len());

            let peers: Vec<String> = peer_ids.iter().filter(|id| **id != candidate.neuron.id).cloned().collect();
            let max_co = self.max_co_activation_weight(&candidate.neuron.id, &peers)?;
            let max_inhib = self.max_inhibitory_weight(&candidate.neuron.id, &peers)?;
            let wm_boost = if working_memory.contains(&candidate.neuron.id) { 1.0 } else { 0.0 };

            let boosted = boosted_score(&self.retrieval_config, hybrid, max_co, max_inhib, wm_boost);
            scored.push(ScoredNeuron { neuron: candidate.neuron, score: boosted });
        }
        drop(working_memory);

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        scored.truncate(k);

        let result_ids: Vec<String> = scored.iter().map(|s| s.neuron.id.clone()).collect();

        self.working_memory.lock().unwrap().touch_all(&result_ids);
        if result_ids.len() >= 2 {
            self.episode_buffer.lock().unwrap().push(result_ids.clone());
        }
        self.dopamine.lock().unwrap().decay_on_search();

        let fire_and_forget_ids = if result_ids.len() >= 2 { Some(result_ids) } else { None };

        Ok(RetrievalOutcome { results: scored, fire_and_forget_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nmt_core::config::HnswConfig;

    fn manager() -> NeuronGraphManager {
        NeuronGraphManager::new(
            NeuronStore::open_in_memory().unwrap(),
            SynapseStore::open_in_memory().unwrap(),
            ChunkStore::open_in_memory().unwrap(),
            HnswIndex::new(&HnswConfig::default()),
            GraphConfig::default(),
            RetrievalConfig::default(),
        )
    }

    fn unit(mut v: Vec<f32>) -> Vec<f32> {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }

    #[test]
    fn create_neuron_auto_connects_above_threshold() {
        let mut mgr = manager();
        mgr.graph_config.auto_connect_threshold = 0.9;
        mgr.graph_config.auto_connect_k = 3;

        let a = mgr.create_neuron(unit(vec![1.0, 0.0, 0.0]), vec![], "r1".into(), "note").unwrap();
        let b = mgr
            .create_neuron(unit(vec![0.999, 0.001, 0.0]), vec![], "r2".into(), "note")
            .unwrap();

        let b_reloaded = mgr.neurons.get(&b.id).unwrap().unwrap();
        assert_eq!(b_reloaded.incoming_synapses.len(), 1);
        assert!(mgr.find_synapse(&b.id, &a.id, SynapseType::Semantic).unwrap().is_some());
    }

    #[test]
    fn connect_rejects_nonexistent_neurons() {
        let mgr = manager();
        let err = mgr.connect("missing-a", "missing-b", SynapseType::Semantic, None, false);
        assert!(err.is_err());
    }

    #[test]
    fn delete_neuron_cascades_synapses() {
        let mgr = manager();
        let a = mgr.create_neuron(unit(vec![1.0, 0.0]), vec![], "ra".into(), "note").unwrap();
        let b = mgr.create_neuron(unit(vec![0.0, 1.0]), vec![], "rb".into(), "note").unwrap();
        mgr.connect(&a.id, &b.id, SynapseType::Semantic, Some(0.5), true).unwrap();

        mgr.delete_neuron(&a.id).unwrap();

        assert!(mgr.neurons.get(&a.id).unwrap().is_none());
        let b_reloaded = mgr.neurons.get(&b.id).unwrap().unwrap();
        assert!(b_reloaded.incoming_synapses.is_empty());
        assert!(b_reloaded.outgoing_synapses.is_empty());
    }

    #[test]
    fn reinforce_co_activation_creates_and_strengthens_associative_edge() {
        let mgr = manager();
        let a = mgr.create_neuron(unit(vec![1.0, 0.0]), vec![], "ra".into(), "note").unwrap();
        let b = mgr.create_neuron(unit(vec![0.0, 1.0]), vec![], "rb".into(), "note").unwrap();
        let ids = vec![a.id.clone(), b.id.clone()];

        mgr.reinforce_co_activation(&ids).unwrap();
        let first = mgr.find_synapse(&a.id, &b.id, SynapseType::Associative).unwrap().unwrap();

        mgr.reinforce_co_activation(&ids).unwrap();
        let second = mgr.find_synapse(&a.id, &b.id, SynapseType::Associative).unwrap().unwrap();

        assert!(second.weight > first.weight);
    }

    #[test]
    fn max_co_activation_weight_finds_strongest_edge() {
        let mgr = manager();
        let a = mgr.create_neuron(unit(vec![1.0, 0.0]), vec![], "ra".into(), "note").unwrap();
        let b = mgr.create_neuron(unit(vec![0.0, 1.0]), vec![], "rb".into(), "note").unwrap();
        mgr.connect(&a.id, &b.id, SynapseType::Associative, Some(0.8), false).unwrap();

        let max = mgr.max_co_activation_weight(&a.id, &[b.id.clone()]).unwrap();
        assert!((max - 0.8).abs() < 1e-9);
    }

    #[test]
    fn pattern_complete_is_noop_on_empty_index() {
        let mgr = manager();
        let query = unit(vec![1.0, 0.0, 0.0]);
        let result = mgr.pattern_complete(query.clone(), 5, 3, 0.3).unwrap();
        assert_eq!(result, query);
    }

    #[test]
    fn retrieve_updates_working_memory_and_episode_buffer() {
        let mgr = manager();
        let a = mgr.create_neuron(unit(vec![1.0, 0.0]), vec![], "ra".into(), "note").unwrap();
        let b = mgr.create_neuron(unit(vec![0.9, 0.1]), vec![], "rb".into(), "note").unwrap();

        let outcome = mgr
            .retrieve(unit(vec![1.0, 0.0]), None, 5, 0.0, None, None)
            .unwrap();

        assert!(!outcome.results.is_empty());
        assert!(outcome.fire_and_forget_ids.is_some());
        let wm = mgr.working_memory.lock().unwrap();
        assert!(wm.contains(&a.id) || wm.contains(&b.id));
    }

    #[test]
    fn prune_synapses_dry_run_does_not_mutate() {
        let mgr = manager();
        let a = mgr.create_neuron(unit(vec![1.0, 0.0]), vec![], "ra".into(), "note").unwrap();
        let b = mgr.create_neuron(unit(vec![0.0, 1.0]), vec![], "rb".into(), "note").unwrap();
        mgr.connect(&a.id, &b.id, SynapseType::Associative, Some(0.01), false).unwrap();

        let report = mgr.prune_synapses(0.5, 10, true).unwrap();
        assert_eq!(report.pruned, 1);
        assert!(mgr.find_synapse(&a.id, &b.id, SynapseType::Associative).unwrap().is_some());

        let report = mgr.prune_synapses(0.5, 10, false).unwrap();
        assert_eq!(report.pruned, 1);
        assert!(mgr.find_synapse(&a.id, &b.id, SynapseType::Associative).unwrap().is_none());
    }

    #[test]
    fn record_feedback_nudges_embedding_and_updates_metadata() {
        use test_fixtures::DeterministicEmbeddingProvider;
        let mgr = manager();
        let embedder = DeterministicEmbeddingProvider::new(2);
        let a = mgr.create_neuron(unit(vec![1.0, 0.0]), vec![], "ra".into(), "note").unwrap();

        mgr.record_feedback(&a.id, "some query text", true, &embedder).unwrap();

        let reloaded = mgr.neurons.get(&a.id).unwrap().unwrap();
        assert_eq!(reloaded.metadata.feedback_count, 1);
        assert!(reloaded.metadata.embedding_drift >= 0.0);
    }
}
