use nmt_core::errors::NmtError;

use crate::{Neuron, SearchOptions, SearchResult, Store};

impl Store {
    /// `search` (spec §6): embeds `query`, runs the hybrid retrieval
    /// pipeline, and dispatches the fire-and-forget Hebbian/inhibitory/
    /// episodic learning updates through the serial task queue.
    pub fn search(&self, query: &str, opts: SearchOptions) -> Result<Vec<SearchResult>, NmtError> {
        let embedding = self.embedder.embed(query)?;
        self.search_embedding(embedding, Some(query), opts)
    }

    /// `searchSimilarTo` (spec §6): same pipeline seeded from an existing
    /// neuron's embedding instead of a fresh query string.
    pub fn search_similar_to(
        &self,
        neuron_id: &str,
        opts: SearchOptions,
    ) -> Result<Vec<SearchResult>, NmtError> {
        let neuron = self
            .get_neuron(neuron_id)?
            .ok_or_else(|| NmtError::NotFound(neuron_id.to_string()))?;
        self.search_embedding(neuron.embedding, None, opts)
    }

    fn search_embedding(
        &self,
        embedding: Vec<f32>,
        query_text: Option<&str>,
        opts: SearchOptions,
    ) -> Result<Vec<SearchResult>, NmtError> {
        let retrieval = &self.config.retrieval;
        let k = opts
            .k
            .unwrap_or(retrieval.default_k)
            .min(retrieval.result_cap_returned);
        let threshold = opts.threshold.unwrap_or(retrieval.default_threshold);

        let outcome = self.graph.retrieve(
            embedding,
            query_text,
            k,
            threshold,
            opts.tags.as_ref(),
            opts.source_type.as_deref(),
        )?;

        if let Some(ids) = outcome.fire_and_forget_ids {
            self.dispatch_learning(ids);
        }

        outcome
            .results
            .into_iter()
            .map(|scored| self.to_search_result(scored.neuron, scored.score, &opts))
            .collect()
    }

    fn to_search_result(
        &self,
        neuron: Neuron,
        score: f64,
        opts: &SearchOptions,
    ) -> Result<SearchResult, NmtError> {
        let content = if opts.include_content {
            Some(self.get_content(&neuron)?)
        } else {
            None
        };
        // Representative proof over the neuron's first chunk; callers
        // wanting a proof for a specific chunk use `generate_proof`.
        let proof = if opts.include_proof {
            self.generate_proof(&neuron.id, 0)?
        } else {
            None
        };
        Ok(SearchResult { neuron, score, content, proof })
    }

    fn dispatch_learning(&self, ids: Vec<String>) {
        let graph = self.graph.clone();
        let metrics = self.metrics.clone();
        let submitted = self.task_queue.submit(Box::new(move || {
            if let Err(e) = graph.reinforce_co_activation(&ids) {
                tracing::warn!(error = %e, "reinforce_co_activation failed");
            }
            if let Err(e) = graph.inhibit_co_activation(&ids) {
                tracing::warn!(error = %e, "inhibit_co_activation failed");
            }
            if let Err(e) = graph.encode_episode(&ids) {
                tracing::warn!(error = %e, "encode_episode failed");
            }
            metrics.counter_inc("retrieve.fire_and_forget_runs");
        }));
        if let Err(e) = submitted {
            tracing::warn!(error = %e, "failed to submit fire-and-forget learning task");
        }
    }
}
