//! Ingestion pipeline and store persistence, end to end with a mock
//! embedder.

mod common;

use std::sync::Arc;

use common::mocks::{FailingEmbedder, MockEmbedder, MockLlmClient, OverlapReranker};
use common::test_config;
use sage::db::VectorDb;
use sage::rag::embeddings::Embedder;
use sage::engine::ChatEngineBuilder;
use sage::ingest;
use tempfile::TempDir;

fn write_sources(dir: &TempDir) {
    std::fs::write(
        dir.path().join("ec2-guide.txt"),
        "EC2 provides resizable compute capacity in the cloud. \
         Instance types determine the hardware of the host computer.",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("s3-guide.txt"),
        "S3 stores objects in buckets with eleven nines of durability.",
    )
    .unwrap();
}

#[tokio::test]
async fn test_ingest_populates_collection() {
    let store_dir = TempDir::new().unwrap();
    let input_dir = TempDir::new().unwrap();
    write_sources(&input_dir);

    let config = test_config(store_dir.path(), input_dir.path());
    let report = ingest::run(&config, Arc::new(MockEmbedder::new()))
        .await
        .unwrap();

    assert_eq!(report.documents, 2);
    assert!(report.chunks >= 2);
    assert_eq!(report.total_indexed, report.chunks);

    // Collection is durable: a fresh open sees the data
    let db = VectorDb::open(store_dir.path()).await.unwrap();
    let collection = db.get_collection("support_docs").unwrap();
    assert_eq!(collection.count(), report.total_indexed);
}

#[tokio::test]
async fn test_empty_input_dir_fails_without_store_mutation() {
    let store_dir = TempDir::new().unwrap();
    let input_dir = TempDir::new().unwrap();

    let config = test_config(store_dir.path(), input_dir.path());
    let err = ingest::run(&config, Arc::new(MockEmbedder::new()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no documents found"));

    // The store was never touched: no collection exists
    let db = VectorDb::open(store_dir.path()).await.unwrap();
    assert!(db.list_collections().is_empty());
}

#[tokio::test]
async fn test_embedding_failure_aborts_run() {
    let store_dir = TempDir::new().unwrap();
    let input_dir = TempDir::new().unwrap();
    write_sources(&input_dir);

    let config = test_config(store_dir.path(), input_dir.path());
    let err = ingest::run(&config, Arc::new(FailingEmbedder))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("mock embedding failure"));

    let db = VectorDb::open(store_dir.path()).await.unwrap();
    assert!(db.list_collections().is_empty());
}

#[tokio::test]
async fn test_reingesting_twice_keeps_engine_usable() {
    let store_dir = TempDir::new().unwrap();
    let input_dir = TempDir::new().unwrap();
    write_sources(&input_dir);

    let config = test_config(store_dir.path(), input_dir.path());
    let embedder: Arc<dyn Embedder> = Arc::new(MockEmbedder::new());

    let first = ingest::run(&config, Arc::clone(&embedder)).await.unwrap();
    let second = ingest::run(&config, Arc::clone(&embedder)).await.unwrap();

    // Chunk ids are freshly minted each run, so the second run appends;
    // whatever the store yields is what the engine must surface.
    assert!(second.total_indexed >= first.total_indexed);

    let db = VectorDb::open(store_dir.path()).await.unwrap();
    let collection = db.get_collection("support_docs").unwrap();
    let count = collection.count();
    assert_eq!(count, second.total_indexed);

    let engine = ChatEngineBuilder::new()
        .llm(Box::new(MockLlmClient::new("EC2 is a compute service.")))
        .embedder(embedder)
        .reranker(Arc::new(OverlapReranker))
        .collection(collection)
        .build()
        .unwrap();

    // The post-reingestion count is exposed verbatim in the system prompt
    assert!(engine
        .system_prompt()
        .contains(&format!("Total documents stored: {}", count)));

    let reply = engine.chat("What is EC2?").await.unwrap();
    assert!(!reply.answer.is_empty());
    assert!(reply
        .sources
        .iter()
        .any(|s| s.file_name == "ec2-guide.txt"));
}
