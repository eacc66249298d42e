use std::collections::BTreeSet;

/// One node in the layered proximity graph. `connections[l]` is the set of
/// internal node indices this node is linked to at layer `l`; index `0` is
/// always present once inserted, higher layers only up to `self.layer`.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub embedding: Vec<f32>,
    pub layer: usize,
    pub connections: Vec<BTreeSet<usize>>,
    pub tombstoned: bool,
}

impl Node {
    pub fn new(id: String, embedding: Vec<f32>, layer: usize) -> Self {
        Self {
            id,
            embedding,
            layer,
            connections: vec![BTreeSet::new(); layer + 1],
            tombstoned: false,
        }
    }
}
