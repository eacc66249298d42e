//! Hybrid score combination (spec §4.3 steps 5-6): semantic/keyword
//! fusion with an adaptive keyword weight, then a co-activation/
//! inhibition/working-memory boost re-sort pass.

use nmt_core::config::RetrievalConfig;

/// `(1-w)*semantic + w*keyword`, with `w` picked from
/// `RetrievalConfig::keyword_weight_for` by query token count.
pub fn hybrid_score(config: &RetrievalConfig, semantic: f64, keyword: f64, query_token_count: usize) -> f64 {
    let w = config.keyword_weight_for(query_token_count);
    (1.0 - w) * semantic + w * keyword
}

/// `boosted = hybrid + co_activation_boost*max_co_activation -
/// inhibitory_penalty*max_inhibitory + working_memory_boost*wm_boost`.
pub fn boosted_score(
    config: &RetrievalConfig,
    hybrid: f64,
    max_co_activation: f64,
    max_inhibitory: f64,
    working_memory_boost: f64,
) -> f64 {
    hybrid + config.co_activation_boost * max_co_activation
        - config.inhibitory_penalty * max_inhibitory
        + config.working_memory_boost * working_memory_boost
}
