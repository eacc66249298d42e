//! Insert / search / delete / compact over the layered proximity graph
//! (spec §4.2). Distances use cosine similarity mapped to `[0, 1]`.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rayon::prelude::*;

use nmt_core::config::HnswConfig;
use nmt_core::errors::HnswError;

use crate::distance::cosine_score;
use crate::node::Node;
use crate::persist::HnswSnapshot;

pub struct HnswIndex {
    m: usize,
    ef_construction: usize,
    ef_search: usize,
    tombstone_threshold: usize,
    nodes: Vec<Node>,
    id_to_idx: HashMap<String, usize>,
    entry_point: Option<usize>,
    tombstone_count: usize,
}

impl HnswIndex {
    pub fn new(config: &HnswConfig) -> Self {
        Self::with_params(
            config.m,
            config.ef_construction,
            config.ef_search,
            config.tombstone_threshold,
        )
    }

    pub fn with_params(
        m: usize,
        ef_construction: usize,
        ef_search: usize,
        tombstone_threshold: usize,
    ) -> Self {
        Self {
            m: m.max(1),
            ef_construction: ef_construction.max(1),
            ef_search: ef_search.max(1),
            tombstone_threshold,
            nodes: Vec::new(),
            id_to_idx: HashMap::new(),
            entry_point: None,
            tombstone_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.tombstoned).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tombstone_count(&self) -> usize {
        self.tombstone_count
    }

    pub fn needs_compaction(&self) -> bool {
        self.tombstone_count > self.tombstone_threshold
    }

    pub fn has(&self, id: &str) -> bool {
        self.id_to_idx
            .get(id)
            .map(|&idx| !self.nodes[idx].tombstoned)
            .unwrap_or(false)
    }

    fn draw_layer(&self) -> usize {
        let ml = 1.0 / (self.m as f64).ln();
        let u: f64 = rand::thread_rng().gen_range(f64::MIN_POSITIVE..1.0);
        (-u.ln() * ml).floor() as usize
    }

    /// Beam search at one layer starting from `entry_points`, returning up
    /// to `ef` candidates sorted by score descending. Tombstoned nodes are
    /// still traversed (so a single delete does not fragment the graph);
    /// `search()` filters them from the externally visible result set.
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[usize],
        ef: usize,
        layer: usize,
    ) -> Vec<(usize, f32)> {
        let mut visited: HashSet<usize> = entry_points.iter().copied().collect();
        let mut candidates: Vec<(usize, f32)> = entry_points
            .iter()
            .map(|&idx| (idx, cosine_score(query, &self.nodes[idx].embedding)))
            .collect();
        let mut results = candidates.clone();

        while let Some(pos) = candidates
            .iter()
            .enumerate()
            .max_by(|a, b| a.1 .1.partial_cmp(&b.1 .1).unwrap())
            .map(|(i, _)| i)
        {
            let (current, current_score) = candidates.swap_remove(pos);

            if results.len() >= ef {
                let worst = results
                    .iter()
                    .map(|&(_, s)| s)
                    .fold(f32::INFINITY, f32::min);
                if current_score < worst {
                    break;
                }
            }

            if let Some(node) = self.nodes.get(current) {
                if let Some(neighbors) = node.connections.get(layer) {
                    let unvisited: Vec<usize> = neighbors
                        .iter()
                        .copied()
                        .filter(|idx| visited.insert(*idx))
                        .collect();
                    // Each candidate's distance is independent of the others,
                    // so the scan parallelizes cleanly (matters most during
                    // compaction rebuilds, where every live node re-runs it).
                    let scored: Vec<(usize, f32)> = unvisited
                        .par_iter()
                        .map(|&idx| (idx, cosine_score(query, &self.nodes[idx].embedding)))
                        .collect();
                    candidates.extend_from_slice(&scored);
                    results.extend_from_slice(&scored);
                }
            }
            results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
            results.truncate(ef.max(1));
        }

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        results
    }

    fn prune_neighbors(&mut self, node_idx: usize, layer: usize, max_m: usize) {
        if self.nodes[node_idx].connections[layer].len() <= max_m {
            return;
        }
        let embedding = self.nodes[node_idx].embedding.clone();
        let neighbor_ids: Vec<usize> = self.nodes[node_idx].connections[layer].iter().copied().collect();
        let mut scored: Vec<(usize, f32)> = neighbor_ids
            .par_iter()
            .map(|&i| (i, cosine_score(&embedding, &self.nodes[i].embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        scored.truncate(max_m);
        self.nodes[node_idx].connections[layer] = scored.into_iter().map(|(i, _)| i).collect();
    }

    /// Insert a new embedding under `id`. Re-inserting a live id is a
    /// usage error (spec §4.2); re-inserting a tombstoned id resurrects it
    /// as a brand-new node (old edges are not reused).
    pub fn insert(&mut self, id: impl Into<String>, embedding: Vec<f32>) -> Result<(), HnswError> {
        let id = id.into();
        if self.has(&id) {
            return Err(HnswError::DuplicateId(id));
        }

        let layer = self.draw_layer();
        let new_idx = self.nodes.len();

        let Some(entry_idx) = self.entry_point else {
            self.nodes.push(Node::new(id.clone(), embedding, layer));
            self.id_to_idx.insert(id, new_idx);
            self.entry_point = Some(new_idx);
            return Ok(());
        };

        let top_layer = self.nodes[entry_idx].layer;
        let mut current = entry_idx;

        for l in (layer + 1..=top_layer).rev() {
            if let Some(&(best, _)) = self.search_layer(&embedding, &[current], 1, l).first() {
                current = best;
            }
        }

        let mut node = Node::new(id.clone(), embedding.clone(), layer);
        for l in (0..=layer.min(top_layer)).rev() {
            let candidates = self.search_layer(&embedding, &[current], self.ef_construction, l);
            let m_at_layer = if l == 0 { self.m * 2 } else { self.m };
            for &(nbr, _) in candidates.iter().take(m_at_layer) {
                node.connections[l].insert(nbr);
            }
            if let Some(&(best, _)) = candidates.first() {
                current = best;
            }
        }

        self.nodes.push(node);
        self.id_to_idx.insert(id, new_idx);

        for l in 0..=layer.min(top_layer) {
            let m_at_layer = if l == 0 { self.m * 2 } else { self.m };
            let neighbor_ids: Vec<usize> = self.nodes[new_idx].connections[l].iter().copied().collect();
            for nbr_idx in neighbor_ids {
                if l < self.nodes[nbr_idx].connections.len() {
                    self.nodes[nbr_idx].connections[l].insert(new_idx);
                    self.prune_neighbors(nbr_idx, l, m_at_layer);
                }
            }
        }

        if layer > top_layer {
            self.entry_point = Some(new_idx);
        }

        Ok(())
    }

    /// Exact-k nearest neighbors to `query`. `ef` defaults to
    /// `max(ef_search, k)` when `None`.
    pub fn search(&self, query: &[f32], k: usize, ef: Option<usize>) -> Vec<(String, f32)> {
        let Some(entry_idx) = self.entry_point else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let top_layer = self.nodes[entry_idx].layer;
        let mut current = entry_idx;
        for l in (1..=top_layer).rev() {
            if let Some(&(best, _)) = self.search_layer(query, &[current], 1, l).first() {
                current = best;
            }
        }

        let ef = ef.unwrap_or(self.ef_search).max(k);
        let mut results = self.search_layer(query, &[current], ef, 0);
        results.retain(|&(idx, _)| !self.nodes[idx].tombstoned);
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        results.truncate(k);
        results
            .into_iter()
            .map(|(idx, score)| (self.nodes[idx].id.clone(), score))
            .collect()
    }

    /// Soft-delete: mark the node tombstoned. Errors if `id` is not a
    /// live member of the index.
    pub fn delete(&mut self, id: &str) -> Result<(), HnswError> {
        let idx = *self
            .id_to_idx
            .get(id)
            .ok_or_else(|| HnswError::NotFound(id.to_string()))?;
        if self.nodes[idx].tombstoned {
            return Err(HnswError::NotFound(id.to_string()));
        }
        self.nodes[idx].tombstoned = true;
        self.tombstone_count += 1;

        if self.entry_point == Some(idx) {
            self.entry_point = self
                .nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| !n.tombstoned)
                .max_by_key(|(_, n)| n.layer)
                .map(|(i, _)| i);
        }
        Ok(())
    }

    /// Rebuild the index from scratch, dropping tombstoned nodes and
    /// reinserting live ones in their original relative order.
    pub fn compact(&mut self) {
        let live: Vec<(String, Vec<f32>)> = self
            .nodes
            .iter()
            .filter(|n| !n.tombstoned)
            .map(|n| (n.id.clone(), n.embedding.clone()))
            .collect();

        let mut fresh = Self::with_params(
            self.m,
            self.ef_construction,
            self.ef_search,
            self.tombstone_threshold,
        );
        for (id, embedding) in live {
            let _ = fresh.insert(id, embedding);
        }
        *self = fresh;
    }

    /// Reconstruct an index directly from already-validated parts (used
    /// by `HnswSnapshot::into_index` after it has checked every
    /// connection id resolves to a real node).
    pub(crate) fn from_parts(
        m: usize,
        ef_construction: usize,
        ef_search: usize,
        tombstone_threshold: usize,
        nodes: Vec<Node>,
        id_to_idx: HashMap<String, usize>,
        entry_point: Option<usize>,
    ) -> Self {
        let tombstone_count = nodes.iter().filter(|n| n.tombstoned).count();
        Self {
            m,
            ef_construction,
            ef_search,
            tombstone_threshold,
            nodes,
            id_to_idx,
            entry_point,
            tombstone_count,
        }
    }

    pub fn to_snapshot(&self) -> HnswSnapshot {
        HnswSnapshot::from_index(self)
    }

    pub fn from_snapshot(snapshot: HnswSnapshot) -> Result<Self, HnswError> {
        snapshot.into_index()
    }

    pub(crate) fn raw_nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn raw_entry_point(&self) -> Option<usize> {
        self.entry_point
    }

    pub(crate) fn params(&self) -> (usize, usize, usize, usize) {
        (self.m, self.ef_construction, self.ef_search, self.tombstone_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn exact_hit_after_insert() {
        let config = HnswConfig::default();
        let mut index = HnswIndex::new(&config);
        for i in 0..50 {
            let v = unit(vec![(i as f32).sin(), (i as f32).cos(), i as f32 * 0.01]);
            index.insert(format!("n{i}"), v).unwrap();
        }
        let target = unit(vec![0.42, 0.55, 0.03]);
        index.insert("target", target.clone()).unwrap();

        let results = index.search(&target, 1, None);
        assert_eq!(results[0].0, "target");
        assert!(results[0].1 > 0.999);
    }

    #[test]
    fn results_sorted_descending_by_score() {
        let config = HnswConfig::default();
        let mut index = HnswIndex::new(&config);
        for i in 0..30 {
            let v = unit(vec![(i as f32 * 0.3).sin(), (i as f32 * 0.7).cos(), 0.1]);
            index.insert(format!("n{i}"), v).unwrap();
        }
        let query = unit(vec![0.5, 0.5, 0.1]);
        let results = index.search(&query, 10, None);
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn delete_hides_until_reinsert() {
        let config = HnswConfig::default();
        let mut index = HnswIndex::new(&config);
        for i in 0..10 {
            let v = unit(vec![i as f32, 1.0, 0.0]);
            index.insert(format!("n{i}"), v).unwrap();
        }
        index.delete("n3").unwrap();
        assert!(!index.has("n3"));
        let results = index.search(&unit(vec![3.0, 1.0, 0.0]), 10, None);
        assert!(!results.iter().any(|(id, _)| id == "n3"));

        index.insert("n3", unit(vec![3.0, 1.0, 0.0])).unwrap();
        assert!(index.has("n3"));
    }

    #[test]
    fn duplicate_insert_is_an_error() {
        let config = HnswConfig::default();
        let mut index = HnswIndex::new(&config);
        index.insert("a", unit(vec![1.0, 0.0])).unwrap();
        assert!(index.insert("a", unit(vec![0.0, 1.0])).is_err());
    }

    #[test]
    fn compact_drops_tombstones_and_preserves_search() {
        let config = HnswConfig::default();
        let mut index = HnswIndex::new(&config);
        for i in 0..20 {
            let v = unit(vec![i as f32, 2.0, 0.0]);
            index.insert(format!("n{i}"), v).unwrap();
        }
        index.delete("n5").unwrap();
        index.delete("n9").unwrap();
        assert_eq!(index.len(), 18);

        index.compact();
        assert_eq!(index.tombstone_count(), 0);
        assert_eq!(index.len(), 18);
        assert!(!index.has("n5"));

        let results = index.search(&unit(vec![12.0, 2.0, 0.0]), 1, None);
        assert_eq!(results[0].0, "n12");
    }
}
