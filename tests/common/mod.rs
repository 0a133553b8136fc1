#![allow(dead_code)]

//! Shared test fixtures.

pub mod mocks;

use std::path::Path;
use std::sync::Arc;

use sage::db::{Collection, VectorDb};
use sage::rag::embeddings::Embedder;
use sage::types::{Document, DocumentMetadata};
use sage::utils::config::{
    Config, EvalConfig, IngestConfig, LlmConfig, RagConfig, ServerConfig, StoreConfig,
};
use tempfile::TempDir;

use mocks::MockEmbedder;

/// A config pointing every path at throwaway locations, with the mock
/// embedder's dimensionality baked into the retrieval parameters.
pub fn test_config(store_path: &Path, input_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        llm: LlmConfig {
            google_api_key: "test-key".to_string(),
            model: "gemini-2.5-pro".to_string(),
        },
        store: StoreConfig {
            path: store_path.to_path_buf(),
            collection: "support_docs".to_string(),
        },
        rag: RagConfig {
            embed_model_dir: store_path.join("models"),
            chunk_size: 50,
            chunk_overlap: 10,
            retrieve_top_k: 10,
            hybrid_alpha: 0.5,
            rerank_top_n: 3,
            memory_token_limit: 3000,
        },
        ingest: IngestConfig {
            input_dir: input_dir.to_path_buf(),
        },
        eval: EvalConfig {
            output_path: store_path.join("rag_eval_results.json"),
            pause_secs: 0,
        },
    }
}

fn chunk(id: &str, content: &str, file_name: &str, embedding: Vec<f32>) -> Document {
    Document {
        id: id.to_string(),
        content: content.to_string(),
        metadata: DocumentMetadata {
            file_name: file_name.to_string(),
            page_label: "1".to_string(),
            source: format!("./data/{}", file_name),
            created_at: chrono::Utc::now(),
        },
        embedding: Some(embedding),
    }
}

/// Open a store in a fresh temp dir and seed it with a small AWS-flavored
/// collection embedded via [`MockEmbedder`]. The temp dir must be kept
/// alive for the collection's lifetime.
pub async fn seeded_store() -> (TempDir, Arc<Collection>) {
    let dir = TempDir::new().unwrap();
    let embedder = MockEmbedder::new();

    let db = VectorDb::open(dir.path()).await.unwrap();
    let collection = db.get_or_create_collection("support_docs", embedder.dimensions());

    let texts = [
        (
            "c1",
            "EC2 provides resizable compute capacity in the cloud as virtual servers.",
            "ec2-guide.pdf",
        ),
        (
            "c2",
            "EC2 instance types determine the hardware of the host computer.",
            "ec2-guide.pdf",
        ),
        (
            "c3",
            "S3 stores objects in buckets with eleven nines of durability.",
            "s3-guide.pdf",
        ),
    ];

    let mut chunks = Vec::new();
    for (id, content, file_name) in texts {
        let embedding = embedder.embed(content).await.unwrap();
        chunks.push(chunk(id, content, file_name, embedding));
    }
    collection.upsert(chunks).unwrap();
    collection.save().await.unwrap();

    (dir, collection)
}
