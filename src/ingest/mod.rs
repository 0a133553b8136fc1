//! Document ingestion pipeline: load, chunk, embed, store.
//!
//! Re-running the pipeline re-embeds everything the loader discovers and
//! upserts it; there are no incremental semantics. Duplicate handling is
//! the collection's id-keyed upsert. Any load, embedding, or storage error
//! aborts the run - documents are loaded before the store is touched, so a
//! failed load never mutates the collection.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::db::VectorDb;
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::Embedder;
use crate::rag::loader::load_documents;
use crate::types::{Document, Result};
use crate::utils::config::Config;

/// Outcome of one ingestion run.
#[derive(Debug)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub collection: String,
    /// Collection size after the upsert, whatever the store's id-keyed
    /// dedup behavior yielded.
    pub total_indexed: usize,
}

/// Run the full pipeline against the configured input directory and store.
pub async fn run(config: &Config, embedder: Arc<dyn Embedder>) -> Result<IngestReport> {
    info!(dir = %config.ingest.input_dir.display(), "loading documents");
    let documents = load_documents(&config.ingest.input_dir)?;
    info!(count = documents.len(), "loaded documents");

    let chunker = TextChunker::new(config.rag.chunk_size, config.rag.chunk_overlap);
    let mut chunks: Vec<Document> = Vec::new();
    for doc in &documents {
        for text in chunker.chunk(&doc.content) {
            chunks.push(Document {
                id: Uuid::new_v4().to_string(),
                content: text,
                metadata: doc.metadata.clone(),
                embedding: None,
            });
        }
    }
    info!(count = chunks.len(), "chunked documents");

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    info!("embedding chunks - this may take a few minutes on the first run");
    let embeddings = embedder.embed_batch(&texts).await?;
    for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
        chunk.embedding = Some(embedding);
    }

    let db = VectorDb::open(&config.store.path).await?;
    let collection =
        db.get_or_create_collection(&config.store.collection, embedder.dimensions());

    let upserted = collection.upsert(chunks)?;
    collection.save().await?;

    let report = IngestReport {
        documents: documents.len(),
        chunks: upserted,
        collection: collection.name().to_string(),
        total_indexed: collection.count(),
    };

    info!(
        collection = report.collection.as_str(),
        total = report.total_indexed,
        "ingestion complete"
    );

    Ok(report)
}
