//! End-to-end scenarios against a real (tempdir-backed) `Store`, mirroring
//! the literal walkthroughs used to validate the subsystem crates
//! individually: ingest/retrieve, delete cascade, attractor path finding,
//! and feedback-driven embedding drift.

use std::collections::BTreeSet;

use nmt::{IngestOptions, SearchOptions, Store, SynapseType};
use nmt_core::config::NmtConfig;
use nmt_core::models::ChangeOperation;

fn open_store() -> (std::sync::Arc<Store>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = NmtConfig::default();
    config.storage.data_dir = dir.path().to_string_lossy().into_owned();
    config.embedding.provider = "hashed".to_string();
    let store = Store::open(config).expect("open store");
    (store, dir)
}

#[test]
fn ingest_then_search_finds_the_neuron() {
    let (store, _dir) = open_store();

    let neuron = store
        .ingest_text("Rust ownership prevents data races at compile time.", IngestOptions::default())
        .expect("ingest");

    assert!((neuron.embedding_norm() - 1.0).abs() < 1e-3);
    assert!(!neuron.chunk_hashes.is_empty());
    assert!(!neuron.merkle_root.is_empty());

    let results = store
        .search("Rust ownership prevents data races at compile time.", SearchOptions::default())
        .expect("search");

    assert!(results.iter().any(|r| r.neuron.id == neuron.id));
}

#[test]
fn ingest_round_trips_content_through_get_content() {
    let (store, _dir) = open_store();
    let text = "Content-defined chunking adapts boundaries to the data.";
    let neuron = store.ingest_text(text, IngestOptions::default()).expect("ingest");

    let content = store.get_content(&neuron).expect("get_content");
    assert_eq!(content, text);
}

#[test]
fn verify_neuron_succeeds_for_freshly_ingested_content() {
    let (store, _dir) = open_store();
    let neuron = store
        .ingest_text("Merkle trees let you prove a chunk without revealing the rest.", IngestOptions::default())
        .expect("ingest");

    let report = store.verify_neuron(&neuron.id).expect("verify");
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert!(report.details.merkle_valid);
    assert!(report.details.chunk_hash_mismatches.is_empty());
}

#[test]
fn generate_proof_verifies_and_out_of_bounds_is_none() {
    let (store, _dir) = open_store();
    let neuron = store.ingest_text("a single short chunk", IngestOptions::default()).expect("ingest");

    let proof = store.generate_proof(&neuron.id, 0).expect("proof").expect("some proof");
    assert!(store.verify_proof(&proof));

    let out_of_bounds = store.generate_proof(&neuron.id, 999).expect("proof lookup");
    assert!(out_of_bounds.is_none());

    let missing_neuron = store.generate_proof("does-not-exist", 0).expect("proof lookup");
    assert!(missing_neuron.is_none());
}

#[test]
fn delete_neuron_cascades_both_directions_of_a_bidirectional_synapse() {
    let (store, _dir) = open_store();

    let a = store.ingest_text("alpha neuron content", IngestOptions::default()).expect("ingest a");
    let b = store.ingest_text("beta neuron content", IngestOptions::default()).expect("ingest b");

    store
        .connect(&a.id, &b.id, SynapseType::Semantic, Some(0.6), true)
        .expect("connect");

    store.delete_neuron(&a.id).expect("delete a");

    assert!(store.get_neuron(&a.id).expect("get a").is_none());
    let b_reloaded = store.get_neuron(&b.id).expect("get b").expect("b still exists");
    assert!(b_reloaded.incoming_synapses.is_empty());
    assert!(b_reloaded.outgoing_synapses.is_empty());
}

#[test]
fn tags_and_source_type_round_trip_through_ingest() {
    let (store, _dir) = open_store();
    let mut tags = BTreeSet::new();
    tags.insert("project-x".to_string());
    tags.insert("design-doc".to_string());

    let neuron = store
        .ingest_text(
            "Design notes for project X.",
            IngestOptions {
                source_type: "document".to_string(),
                tags: tags.clone(),
                ..Default::default()
            },
        )
        .expect("ingest");

    assert_eq!(neuron.metadata.source_type, "document");
    assert_eq!(neuron.metadata.tags, tags);
}

#[test]
fn create_attractor_and_find_path_from_a_connected_neuron() {
    let (store, _dir) = open_store();

    let start = store.ingest_text("starting point of the plan", IngestOptions::default()).expect("ingest start");
    let waypoint = store.ingest_text("an intermediate waypoint", IngestOptions::default()).expect("ingest waypoint");
    store
        .connect(&start.id, &waypoint.id, SynapseType::Causal, Some(0.9), false)
        .expect("connect start->waypoint");

    let attractor = store
        .create_attractor("finish the report".to_string(), "write up the quarterly report".to_string(), 8, None, vec![])
        .expect("create attractor");

    store
        .connect(&waypoint.id, &attractor.id, SynapseType::Causal, Some(0.9), false)
        .expect("connect waypoint->attractor");

    let path = store
        .find_path_to_attractor(&start.id, &attractor.id, None)
        .expect("find path");
    assert!(!path.path.is_empty());
    assert_eq!(path.path.first().map(String::as_str), Some(start.id.as_str()));
}

#[test]
fn record_feedback_five_times_increases_drift_and_bounds_dopamine() {
    let (store, _dir) = open_store();
    let neuron = store
        .ingest_text("feedback target content that gets nudged repeatedly", IngestOptions::default())
        .expect("ingest");

    let mut last_drift = 0.0;
    for _ in 0..5 {
        store
            .record_feedback(&neuron.id, "feedback target content that gets nudged repeatedly", true)
            .expect("record feedback");
        let reloaded = store.get_neuron(&neuron.id).expect("get").expect("exists");
        assert!(reloaded.metadata.embedding_drift >= last_drift);
        last_drift = reloaded.metadata.embedding_drift;
    }

    let final_neuron = store.get_neuron(&neuron.id).expect("get").expect("exists");
    assert_eq!(final_neuron.metadata.feedback_count, 5);
    assert!((final_neuron.embedding_norm() - 1.0).abs() < 1e-3);
}

#[test]
fn gc_chunks_keeps_only_chunks_referenced_by_a_surviving_neuron() {
    let (store, _dir) = open_store();
    let keep = store.ingest_text("this neuron survives", IngestOptions::default()).expect("ingest keep");
    let drop = store.ingest_text("this neuron gets deleted", IngestOptions::default()).expect("ingest drop");

    store.delete_neuron(&drop.id).expect("delete");
    store.gc_chunks().expect("gc");

    let content = store.get_content(&keep).expect("content still reachable");
    assert_eq!(content, "this neuron survives");
}

#[test]
fn sync_accepts_a_remote_neuron_change_with_no_local_history() {
    let (store, _dir) = open_store();

    let before = store.sync.status();
    assert_eq!(before.node_id, store.config().journal.node_id);

    let remote_neuron = test_fixtures::make_neuron("remote-1", store.config().embedding.dimensions);
    let remote_entry = nmt_core::models::ChangeEntry {
        sequence: 1,
        entity_type: "neuron".to_string(),
        operation: ChangeOperation::Create,
        entity_id: remote_neuron.id.clone(),
        data: serde_json::to_value(&remote_neuron).expect("serialize"),
        vector_clock: nmt_core::models::VectorClock::new(),
        timestamp: chrono::Utc::now(),
        node_id: "peer-node".to_string(),
        metadata: None,
    };

    let report = store.sync.apply_remote_changes(vec![remote_entry]).expect("apply remote");
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.pending, 0);

    let stored = store.get_neuron("remote-1").expect("get").expect("remote neuron landed");
    assert_eq!(stored.id, "remote-1");
}

#[test]
fn health_report_is_healthy_for_a_freshly_opened_store() {
    let (store, _dir) = open_store();
    store.ingest_text("keep health checks honest", IngestOptions::default()).expect("ingest");

    let report = store.health().expect("health");
    assert_eq!(report.overall, nmt::HealthStatus::Healthy);
    assert_eq!(report.metrics.neuron_count, 1);
    assert!(!report.metrics.embedding_degraded_mode);
}

#[tokio::test]
async fn background_ingestion_job_completes_and_creates_a_neuron() {
    let (store, _dir) = open_store();
    let job_id = store.start_ingestion_job("some text to ingest in the background".to_string(), IngestOptions::default());

    let mut job = store.get_job(&job_id).expect("job exists");
    for _ in 0..50 {
        if job.is_terminal() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        job = store.get_job(&job_id).expect("job exists");
    }

    assert!(matches!(job.status, nmt::JobStatus::Completed));
    let neuron_id = job.neuron_id.expect("completed job records a neuron id");
    assert!(store.get_neuron(&neuron_id).expect("get neuron").is_some());
}
