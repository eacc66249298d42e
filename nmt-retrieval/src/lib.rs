//! Keyword scoring and hybrid fusion math (spec §4.3 steps 4-6).
//!
//! Kept as a crate of pure scoring functions, separate from the graph
//! manager that calls them, the way the teacher keeps `cortex-retrieval`
//! separate from `cortex-causal`. Grounded on
//! `cortex-retrieval/tests/stress_test.rs`'s adaptive-weighting and
//! fusion-scoring shape; the teacher's reciprocal-rank fusion
//! (`rrf_fusion::fuse`) does not carry over because the spec's hybrid
//! formula fuses two scores directly rather than merging ranked lists.

pub mod bm25;
pub mod fusion;
pub mod tokenizer;

pub use bm25::bm25_score;
pub use fusion::{boosted_score, hybrid_score};
pub use tokenizer::{contains_cjk, tokenize};
