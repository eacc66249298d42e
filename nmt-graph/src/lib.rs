//! Neuron graph manager: Hopfield-style pattern completion, Hebbian and
//! inhibitory co-activation learning, and the hybrid retrieval pipeline
//! over neurons and synapses (spec §4.3; grounded on the outer shape of
//! `cortex-causal::graph::GraphManager`).
//!
//! Unlike the teacher's `GraphManager`, this crate does not keep a second
//! in-memory adjacency structure mirroring the synapse store. `nmt-storage`
//! already exposes `source:`/`target:` prefix-scan indexes that make
//! outgoing/incoming lookups O(degree), so a duplicate `petgraph` graph
//! here would just be state to keep in sync on every write. `petgraph` is
//! used instead where it is the right tool: `nmt-planner`'s A* search.

mod dopamine;
mod episode_buffer;
mod manager;
mod working_memory;

pub use dopamine::Dopamine;
pub use episode_buffer::EpisodeBuffer;
pub use manager::{NeuronGraphManager, PruneReport, RetrievalOutcome, ScoredNeuron};
pub use working_memory::WorkingMemory;
