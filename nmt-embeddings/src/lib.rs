//! Embedding provider chain + L1/L2 cache (spec §4.3 shared resources,
//! §9 "embedding provider polymorphism").
//!
//! Grounded on `cortex-embeddings/tests/embedding_wiring_test.rs`, which
//! specifies the exact shape this crate reproduces: an `EmbeddingEngine`
//! wrapping a provider chain, a `CacheCoordinator` with `CacheHitTier::{L1,
//! L2, Miss}` promotion semantics, and graceful degradation when the
//! primary provider is unavailable.

pub mod cache;
pub mod engine;
pub mod providers;

pub use engine::EmbeddingEngine;
pub use nmt_core::traits::EmbeddingProvider;
