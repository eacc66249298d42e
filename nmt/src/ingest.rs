use std::sync::Arc;

use chrono::Utc;
use nmt_core::errors::NmtError;
use nmt_core::models::{ChangeOperation, JobStatus};
use nmt_core::traits::EmbeddingProvider;
use nmt_hash::{Chunk, MerkleTree};
use uuid::Uuid;

use crate::{IngestOptions, Neuron, Store};

impl Store {
    /// `ingestText` (spec §6): chunks `text`, stores every chunk, commits
    /// the ordered chunk hashes into a Merkle root, embeds the whole text,
    /// and creates the neuron that anchors them.
    pub fn ingest_text(&self, text: &str, opts: IngestOptions) -> Result<Neuron, NmtError> {
        let chunks = self.chunk_bytes(text.as_bytes(), &opts);
        for chunk in &chunks {
            self.chunks.put(chunk)?;
        }

        let leaves: Vec<String> = chunks.iter().map(|c| c.hash.clone()).collect();
        let merkle_root = MerkleTree::build(leaves.clone())?.root().to_string();
        let embedding = self.embedder.embed(text)?;

        let neuron = self.graph.create_neuron_with_metadata(
            embedding,
            leaves,
            merkle_root,
            opts.source_type.clone(),
            opts.tags.clone(),
            opts.provenance.clone(),
            opts.auto_connect,
            opts.connection_threshold,
        )?;

        self.sync.record_change(
            "neuron",
            ChangeOperation::Create,
            &neuron.id,
            serde_json::to_value(&neuron)?,
        )?;
        self.metrics.counter_inc("ingest.neurons");
        Ok(neuron)
    }

    /// `startIngestionJob` (spec §6, §5 cancellation): runs the same
    /// pipeline as [`Store::ingest_text`] on a background task, checking
    /// for cancellation between each chunk write, and returns the job id
    /// immediately.
    pub fn start_ingestion_job(self: &Arc<Self>, text: String, opts: IngestOptions) -> String {
        let job = nmt_core::models::IngestionJob::new(Uuid::new_v4().to_string());
        let job_id = job.id.clone();
        self.jobs.lock().unwrap().insert(job_id.clone(), job);

        let store = self.clone();
        let job_id_task = job_id.clone();
        tokio::spawn(async move {
            store.run_ingestion_job(job_id_task, text, opts).await;
        });

        job_id
    }

    async fn run_ingestion_job(self: Arc<Self>, job_id: String, text: String, opts: IngestOptions) {
        self.set_job_status(&job_id, JobStatus::Running, None, None);

        let chunks = self.chunk_bytes(text.as_bytes(), &opts);
        for chunk in &chunks {
            if self.job_cancelled(&job_id) {
                self.set_job_status(&job_id, JobStatus::Cancelled, None, None);
                return;
            }
            if let Err(e) = self.chunks.put(chunk) {
                self.set_job_status(&job_id, JobStatus::Failed, None, Some(e.to_string()));
                return;
            }
        }

        if self.job_cancelled(&job_id) {
            self.set_job_status(&job_id, JobStatus::Cancelled, None, None);
            return;
        }

        let leaves: Vec<String> = chunks.iter().map(|c| c.hash.clone()).collect();
        let merkle_root = match MerkleTree::build(leaves.clone()) {
            Ok(tree) => tree.root().to_string(),
            Err(e) => {
                self.set_job_status(&job_id, JobStatus::Failed, None, Some(e.to_string()));
                return;
            }
        };

        let embedding = match self.embedder.embed(&text) {
            Ok(embedding) => embedding,
            Err(e) => {
                self.set_job_status(&job_id, JobStatus::Failed, None, Some(e.to_string()));
                return;
            }
        };

        let created = self.graph.create_neuron_with_metadata(
            embedding,
            leaves,
            merkle_root,
            opts.source_type.clone(),
            opts.tags.clone(),
            opts.provenance.clone(),
            opts.auto_connect,
            opts.connection_threshold,
        );

        match created {
            Ok(neuron) => {
                let payload = serde_json::to_value(&neuron).unwrap_or_default();
                let _ = self
                    .sync
                    .record_change("neuron", ChangeOperation::Create, &neuron.id, payload);
                self.metrics.counter_inc("ingest.neurons");
                self.set_job_status(&job_id, JobStatus::Completed, Some(neuron.id), None);
            }
            Err(e) => {
                self.set_job_status(&job_id, JobStatus::Failed, None, Some(e.to_string()));
            }
        }
    }

    fn chunk_bytes(&self, bytes: &[u8], opts: &IngestOptions) -> Vec<Chunk> {
        if opts.use_cdc {
            nmt_hash::cdc::chunk_content_defined(bytes, &self.config.chunk)
        } else {
            let size = opts.chunk_size.unwrap_or(self.config.chunk.fixed_chunk_size);
            nmt_hash::cdc::chunk_fixed(bytes, size)
        }
    }

    fn job_cancelled(&self, job_id: &str) -> bool {
        self.jobs
            .lock()
            .unwrap()
            .get(job_id)
            .map(|job| job.status == JobStatus::Cancelled)
            .unwrap_or(false)
    }

    fn set_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        neuron_id: Option<String>,
        error: Option<String>,
    ) {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(job_id) {
            job.status = status;
            job.updated_at = Utc::now();
            if neuron_id.is_some() {
                job.neuron_id = neuron_id;
            }
            if error.is_some() {
                job.error = error;
            }
        }
    }

    /// Flips a non-terminal job to `Cancelled`; the job loop observes this
    /// between chunk writes (spec §5 "cancelJob flips a flag").
    pub fn cancel_job(&self, job_id: &str) -> Result<(), NmtError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| NmtError::NotFound(job_id.to_string()))?;
        if !job.is_terminal() {
            job.status = JobStatus::Cancelled;
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    pub fn get_job(&self, job_id: &str) -> Option<nmt_core::models::IngestionJob> {
        self.jobs.lock().unwrap().get(job_id).cloned()
    }
}
