//! Smoke workload exercising ingest, search, path planning, and shutdown
//! end to end against a throwaway data directory.

use std::collections::BTreeSet;
use std::time::Instant;

use nmt::{IngestOptions, SearchOptions, Store};
use nmt_core::config::NmtConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let data_dir = std::env::temp_dir().join(format!("nmt-bench-{}", std::process::id()));
    std::fs::create_dir_all(&data_dir)?;

    let mut config = NmtConfig::default();
    config.storage.data_dir = data_dir.to_string_lossy().into_owned();
    config.embedding.provider = "hashed".to_string();

    let store = Store::open(config)?;

    let texts = [
        "TypeScript is a strongly typed superset of JavaScript.",
        "Rust enforces memory safety without a garbage collector.",
        "HNSW builds a layered proximity graph for approximate nearest neighbor search.",
    ];

    let mut tags = BTreeSet::new();
    tags.insert("bench".to_string());

    let ingest_start = Instant::now();
    for text in texts {
        store.ingest_text(
            text,
            IngestOptions {
                tags: tags.clone(),
                ..Default::default()
            },
        )?;
    }
    println!("ingested {} neurons in {:?}", texts.len(), ingest_start.elapsed());

    let search_start = Instant::now();
    let results = store.search("typed programming languages", SearchOptions::default())?;
    println!("search returned {} results in {:?}", results.len(), search_start.elapsed());
    for result in &results {
        println!(
            "  score={:.3} source_type={}",
            result.score, result.neuron.metadata.source_type
        );
    }

    let health = store.health()?;
    println!("health: {:?}", health.overall);

    store.shutdown().await?;
    std::fs::remove_dir_all(&data_dir).ok();
    Ok(())
}
